//! # Address Derivation
//!
//! Maps address-bearing output scripts to their textual encoding
//! (Base58Check for legacy, Bech32 for v0 witness, Bech32m for Taproot)
//! through rust-bitcoin's network-aware encoder.

use crate::fixture::NetworkTag;
use crate::script::{classify_output_script, OutputScriptType};
use bitcoin::{Address, ScriptBuf};

/// Derive the address encoded by a scriptPubKey, if it has one.
///
/// OP_RETURN and unknown scripts carry no address; encoder failures also
/// yield `None` since a non-encodable script is a legitimate state.
pub fn address_from_script(script: &[u8], network: NetworkTag) -> Option<String> {
    match classify_output_script(script) {
        OutputScriptType::P2pkh
        | OutputScriptType::P2sh
        | OutputScriptType::P2wpkh
        | OutputScriptType::P2wsh
        | OutputScriptType::P2tr => {
            let script = ScriptBuf::from_bytes(script.to_vec());
            Address::from_script(script.as_script(), network.to_bitcoin())
                .ok()
                .map(|addr| addr.to_string())
        }
        OutputScriptType::OpReturn | OutputScriptType::Unknown => None,
    }
}
