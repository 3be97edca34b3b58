//! # Transaction Wire Format
//!
//! Decoding and re-encoding of the consensus-serialized transaction format,
//! both legacy and SegWit (BIP144 marker/flag), plus the identity and size
//! figures derived from the two serializations.

use crate::codec::{double_sha256, reversed_hex, write_compact_size, ByteReader};
use crate::config::consensus;
use crate::error::{AnalyzerError, AnalyzerResult};

/// A parsed consensus transaction
#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub locktime: u32,
}

/// A transaction input with its witness stack
#[derive(Debug, Clone)]
pub struct TxInput {
    /// Spent outpoint txid in wire (internal) byte order
    pub prev_txid: [u8; 32],
    pub prev_vout: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TxInput {
    /// Coinbase inputs carry the null outpoint sentinel
    pub fn is_coinbase(&self) -> bool {
        self.prev_txid == [0u8; 32] && self.prev_vout == consensus::COINBASE_VOUT
    }

    /// Spent txid in display order
    pub fn prev_txid_hex(&self) -> String {
        reversed_hex(&self.prev_txid)
    }
}

/// A transaction output
#[derive(Debug, Clone)]
pub struct TxOutput {
    pub value_sats: i64,
    pub script_pubkey: Vec<u8>,
}

impl Transaction {
    /// Decode a transaction from the reader's current position.
    ///
    /// Consumes exactly the transaction's bytes, which is what lets the
    /// block parser pull a stream of transactions off one cursor.
    pub fn decode(reader: &mut ByteReader) -> AnalyzerResult<Self> {
        let version = reader.read_i32_le("tx version")?;

        let mut input_count = reader.read_compact_size("input count")?;
        let mut segwit_encoded = false;
        if input_count == 0 {
            // BIP144: zero marker byte, then the witness flag
            let flag = reader.read_u8("segwit flag")?;
            if flag != 0x01 {
                return Err(AnalyzerError::fixture(format!(
                    "unsupported segwit flag 0x{:02x}",
                    flag
                )));
            }
            segwit_encoded = true;
            input_count = reader.read_compact_size("input count")?;
        }

        let mut inputs = Vec::new();
        for _ in 0..input_count {
            let prev_txid = reader.read_hash("input outpoint txid")?;
            let prev_vout = reader.read_u32_le("input outpoint index")?;
            let script_len = reader.read_compact_size("scriptSig length")? as usize;
            let script_sig = reader.read_bytes(script_len, "scriptSig")?.to_vec();
            let sequence = reader.read_u32_le("input sequence")?;
            inputs.push(TxInput {
                prev_txid,
                prev_vout,
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let output_count = reader.read_compact_size("output count")?;
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            let value_sats = reader.read_u64_le("output value")? as i64;
            let script_len = reader.read_compact_size("scriptPubKey length")? as usize;
            let script_pubkey = reader.read_bytes(script_len, "scriptPubKey")?.to_vec();
            outputs.push(TxOutput {
                value_sats,
                script_pubkey,
            });
        }

        if segwit_encoded {
            for input in &mut inputs {
                let item_count = reader.read_compact_size("witness item count")?;
                let mut items = Vec::new();
                for _ in 0..item_count {
                    let item_len = reader.read_compact_size("witness item length")? as usize;
                    items.push(reader.read_bytes(item_len, "witness item")?.to_vec());
                }
                input.witness = items;
            }
        }

        let locktime = reader.read_u32_le("tx locktime")?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }

    /// Decode a transaction that must be alone in the buffer
    pub fn decode_standalone(raw: &[u8]) -> AnalyzerResult<Self> {
        let mut reader = ByteReader::new(raw);
        Self::decode(&mut reader)
    }

    /// True when any input carries a non-empty witness stack
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Full serialization (SegWit encoding when any witness is present)
    pub fn serialize(&self) -> Vec<u8> {
        self.encode(false)
    }

    /// Serialization with witness data stripped (the txid preimage)
    pub fn serialize_stripped(&self) -> Vec<u8> {
        self.encode(true)
    }

    fn encode(&self, strip_witness: bool) -> Vec<u8> {
        let with_witness = self.has_witness() && !strip_witness;
        let mut out = Vec::new();

        out.extend_from_slice(&self.version.to_le_bytes());

        if with_witness {
            out.extend_from_slice(&[0x00, 0x01]);
        }

        write_compact_size(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(&input.prev_txid);
            out.extend_from_slice(&input.prev_vout.to_le_bytes());
            write_compact_size(&mut out, input.script_sig.len() as u64);
            out.extend_from_slice(&input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&(output.value_sats as u64).to_le_bytes());
            write_compact_size(&mut out, output.script_pubkey.len() as u64);
            out.extend_from_slice(&output.script_pubkey);
        }

        if with_witness {
            for input in &self.inputs {
                write_compact_size(&mut out, input.witness.len() as u64);
                for item in &input.witness {
                    write_compact_size(&mut out, item.len() as u64);
                    out.extend_from_slice(item);
                }
            }
        }

        out.extend_from_slice(&self.locktime.to_le_bytes());
        out
    }

    /// Display-order txid (hash of the stripped serialization)
    pub fn txid(&self) -> String {
        reversed_hex(&double_sha256(&self.serialize_stripped()))
    }

    /// Display-order wtxid (hash of the full serialization)
    pub fn wtxid(&self) -> String {
        reversed_hex(&double_sha256(&self.serialize()))
    }

    /// Internal-order txid, used for Merkle computation
    pub fn txid_bytes(&self) -> [u8; 32] {
        double_sha256(&self.serialize_stripped())
    }

    pub fn total_size(&self) -> usize {
        self.serialize().len()
    }

    pub fn base_size(&self) -> usize {
        self.serialize_stripped().len()
    }

    /// BIP141 weight: stripped size counts four times, witness once
    pub fn weight(&self) -> usize {
        self.base_size() * 3 + self.total_size()
    }

    pub fn vbytes(&self) -> usize {
        (self.weight() + 3) / 4
    }
}
