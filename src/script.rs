//! # Script Classification and Disassembly
//!
//! Closed-enum classification of output and input scripts by byte template,
//! canonical ASM disassembly covering every push opcode, and OP_RETURN
//! payload extraction with protocol tagging.

use crate::config::protocol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Script type of a transaction output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputScriptType {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    OpReturn,
    Unknown,
}

impl fmt::Display for OutputScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputScriptType::P2pkh => write!(f, "p2pkh"),
            OutputScriptType::P2sh => write!(f, "p2sh"),
            OutputScriptType::P2wpkh => write!(f, "p2wpkh"),
            OutputScriptType::P2wsh => write!(f, "p2wsh"),
            OutputScriptType::P2tr => write!(f, "p2tr"),
            OutputScriptType::OpReturn => write!(f, "op_return"),
            OutputScriptType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Script type of a transaction input, resolved against its prevout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputScriptType {
    P2pkh,
    P2sh,
    #[serde(rename = "p2sh-p2wpkh")]
    P2shP2wpkh,
    #[serde(rename = "p2sh-p2wsh")]
    P2shP2wsh,
    P2wpkh,
    P2wsh,
    P2trKeypath,
    P2trScriptpath,
    Unknown,
}

impl InputScriptType {
    /// True for the two cases whose last witness item is a witnessScript
    pub fn has_witness_script(self) -> bool {
        matches!(self, InputScriptType::P2wsh | InputScriptType::P2shP2wsh)
    }
}

impl fmt::Display for InputScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputScriptType::P2pkh => write!(f, "p2pkh"),
            InputScriptType::P2sh => write!(f, "p2sh"),
            InputScriptType::P2shP2wpkh => write!(f, "p2sh-p2wpkh"),
            InputScriptType::P2shP2wsh => write!(f, "p2sh-p2wsh"),
            InputScriptType::P2wpkh => write!(f, "p2wpkh"),
            InputScriptType::P2wsh => write!(f, "p2wsh"),
            InputScriptType::P2trKeypath => write!(f, "p2tr_keypath"),
            InputScriptType::P2trScriptpath => write!(f, "p2tr_scriptpath"),
            InputScriptType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a scriptPubKey by its byte template
pub fn classify_output_script(script: &[u8]) -> OutputScriptType {
    // P2PKH: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    if script.len() == 25
        && script[0] == 0x76
        && script[1] == 0xa9
        && script[2] == 0x14
        && script[23] == 0x88
        && script[24] == 0xac
    {
        return OutputScriptType::P2pkh;
    }

    // P2SH: OP_HASH160 <20 bytes> OP_EQUAL
    if script.len() == 23 && script[0] == 0xa9 && script[1] == 0x14 && script[22] == 0x87 {
        return OutputScriptType::P2sh;
    }

    // P2WPKH: OP_0 <20 bytes>
    if script.len() == 22 && script[0] == 0x00 && script[1] == 0x14 {
        return OutputScriptType::P2wpkh;
    }

    // P2WSH: OP_0 <32 bytes>
    if script.len() == 34 && script[0] == 0x00 && script[1] == 0x20 {
        return OutputScriptType::P2wsh;
    }

    // P2TR: OP_1 <32 bytes>
    if script.len() == 34 && script[0] == 0x51 && script[1] == 0x20 {
        return OutputScriptType::P2tr;
    }

    // OP_RETURN: leading 0x6a, any length
    if !script.is_empty() && script[0] == 0x6a {
        return OutputScriptType::OpReturn;
    }

    OutputScriptType::Unknown
}

/// Classify an input by its scriptSig, witness stack and prevout script.
///
/// Legacy inputs inside otherwise-SegWit transactions can present an empty
/// scriptSig with no witness; those fall back to the prevout type.
pub fn classify_input_script(
    script_sig: &[u8],
    witness: &[Vec<u8>],
    prevout_script: &[u8],
) -> InputScriptType {
    let has_witness = !witness.is_empty();
    let script_sig_empty = script_sig.is_empty();
    let prevout_type = classify_output_script(prevout_script);

    // Taproot keypath: single 64/65-byte signature
    if script_sig_empty
        && witness.len() == 1
        && (witness[0].len() == 64 || witness[0].len() == 65)
        && prevout_type == OutputScriptType::P2tr
    {
        return InputScriptType::P2trKeypath;
    }

    // Taproot scriptpath: control block carries leaf version 0xc0/0xc1
    if script_sig_empty && witness.len() > 1 && prevout_type == OutputScriptType::P2tr {
        if let Some(last) = witness.last() {
            if !last.is_empty() && last[0] & 0xfe == 0xc0 {
                return InputScriptType::P2trScriptpath;
            }
        }
    }

    if script_sig_empty && witness.len() == 2 && prevout_type == OutputScriptType::P2wpkh {
        return InputScriptType::P2wpkh;
    }

    if script_sig_empty && has_witness && prevout_type == OutputScriptType::P2wsh {
        return InputScriptType::P2wsh;
    }

    // P2SH-P2WPKH: scriptSig is a single push of the v0 keyhash program
    if script_sig.len() == 23
        && script_sig[0] == 0x16
        && script_sig[1] == 0x00
        && script_sig[2] == 0x14
        && witness.len() == 2
    {
        return InputScriptType::P2shP2wpkh;
    }

    // P2SH-P2WSH: scriptSig is a single push of the v0 scripthash program
    if script_sig.len() == 35
        && script_sig[0] == 0x22
        && script_sig[1] == 0x00
        && script_sig[2] == 0x20
        && has_witness
    {
        return InputScriptType::P2shP2wsh;
    }

    if !script_sig_empty && !has_witness && prevout_type == OutputScriptType::P2pkh {
        return InputScriptType::P2pkh;
    }

    if script_sig_empty && !has_witness {
        match prevout_type {
            OutputScriptType::P2pkh => return InputScriptType::P2pkh,
            OutputScriptType::P2sh => return InputScriptType::P2sh,
            _ => {}
        }
    }

    InputScriptType::Unknown
}

/// Disassemble a script into the canonical space-separated ASM string.
///
/// An empty script disassembles to the empty string. Pushes that run past
/// the end of the script are truncated gracefully: direct pushes emit the
/// bare `OP_PUSHBYTES_<n>`, PUSHDATA emits whatever payload remains.
pub fn disassemble(script: &[u8]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;

    while i < script.len() {
        let op = script[i];
        i += 1;

        match op {
            0x00 => parts.push("OP_0".to_string()),

            0x01..=0x4b => {
                let n = op as usize;
                if i + n > script.len() {
                    parts.push(format!("OP_PUSHBYTES_{}", n));
                    break;
                }
                parts.push(format!("OP_PUSHBYTES_{} {}", n, hex::encode(&script[i..i + n])));
                i += n;
            }

            0x4c => {
                if i >= script.len() {
                    parts.push("OP_PUSHDATA1".to_string());
                    break;
                }
                let mut n = script[i] as usize;
                i += 1;
                if i + n > script.len() {
                    n = script.len() - i;
                }
                parts.push(pushdata_part("OP_PUSHDATA1", &script[i..i + n]));
                i += n;
            }

            0x4d => {
                if i + 1 >= script.len() {
                    parts.push("OP_PUSHDATA2".to_string());
                    break;
                }
                let mut n = u16::from_le_bytes([script[i], script[i + 1]]) as usize;
                i += 2;
                if i + n > script.len() {
                    n = script.len() - i;
                }
                parts.push(pushdata_part("OP_PUSHDATA2", &script[i..i + n]));
                i += n;
            }

            0x4e => {
                if i + 3 >= script.len() {
                    parts.push("OP_PUSHDATA4".to_string());
                    break;
                }
                let mut n =
                    u32::from_le_bytes([script[i], script[i + 1], script[i + 2], script[i + 3]])
                        as usize;
                i += 4;
                if i + n > script.len() {
                    n = script.len() - i;
                }
                parts.push(pushdata_part("OP_PUSHDATA4", &script[i..i + n]));
                i += n;
            }

            _ => parts.push(opcode_name(op)),
        }
    }

    parts.join(" ")
}

fn pushdata_part(opcode: &str, data: &[u8]) -> String {
    if data.is_empty() {
        opcode.to_string()
    } else {
        format!("{} {}", opcode, hex::encode(data))
    }
}

/// Canonical name for a non-push opcode byte
fn opcode_name(op: u8) -> String {
    let name = match op {
        0x4f => "OP_1NEGATE",
        0x50 => "OP_RESERVED",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        0x60 => "OP_16",
        // Flow control
        0x61 => "OP_NOP",
        0x62 => "OP_VER",
        0x63 => "OP_IF",
        0x64 => "OP_NOTIF",
        0x65 => "OP_VERIF",
        0x66 => "OP_VERNOTIF",
        0x67 => "OP_ELSE",
        0x68 => "OP_ENDIF",
        0x69 => "OP_VERIFY",
        0x6a => "OP_RETURN",
        // Stack
        0x6b => "OP_TOALTSTACK",
        0x6c => "OP_FROMALTSTACK",
        0x6d => "OP_2DROP",
        0x6e => "OP_2DUP",
        0x6f => "OP_3DUP",
        0x70 => "OP_2OVER",
        0x71 => "OP_2ROT",
        0x72 => "OP_2SWAP",
        0x73 => "OP_IFDUP",
        0x74 => "OP_DEPTH",
        0x75 => "OP_DROP",
        0x76 => "OP_DUP",
        0x77 => "OP_NIP",
        0x78 => "OP_OVER",
        0x79 => "OP_PICK",
        0x7a => "OP_ROLL",
        0x7b => "OP_ROT",
        0x7c => "OP_SWAP",
        0x7d => "OP_TUCK",
        // Splice
        0x7e => "OP_CAT",
        0x7f => "OP_SUBSTR",
        0x80 => "OP_LEFT",
        0x81 => "OP_RIGHT",
        0x82 => "OP_SIZE",
        // Bitwise
        0x83 => "OP_INVERT",
        0x84 => "OP_AND",
        0x85 => "OP_OR",
        0x86 => "OP_XOR",
        0x87 => "OP_EQUAL",
        0x88 => "OP_EQUALVERIFY",
        0x89 => "OP_RESERVED1",
        0x8a => "OP_RESERVED2",
        // Arithmetic
        0x8b => "OP_1ADD",
        0x8c => "OP_1SUB",
        0x8d => "OP_2MUL",
        0x8e => "OP_2DIV",
        0x8f => "OP_NEGATE",
        0x90 => "OP_ABS",
        0x91 => "OP_NOT",
        0x92 => "OP_0NOTEQUAL",
        0x93 => "OP_ADD",
        0x94 => "OP_SUB",
        0x95 => "OP_MUL",
        0x96 => "OP_DIV",
        0x97 => "OP_MOD",
        0x98 => "OP_LSHIFT",
        0x99 => "OP_RSHIFT",
        0x9a => "OP_BOOLAND",
        0x9b => "OP_BOOLOR",
        0x9c => "OP_NUMEQUAL",
        0x9d => "OP_NUMEQUALVERIFY",
        0x9e => "OP_NUMNOTEQUAL",
        0x9f => "OP_LESSTHAN",
        0xa0 => "OP_GREATERTHAN",
        0xa1 => "OP_LESSTHANOREQUAL",
        0xa2 => "OP_GREATERTHANOREQUAL",
        0xa3 => "OP_MIN",
        0xa4 => "OP_MAX",
        0xa5 => "OP_WITHIN",
        // Crypto
        0xa6 => "OP_RIPEMD160",
        0xa7 => "OP_SHA1",
        0xa8 => "OP_SHA256",
        0xa9 => "OP_HASH160",
        0xaa => "OP_HASH256",
        0xab => "OP_CODESEPARATOR",
        0xac => "OP_CHECKSIG",
        0xad => "OP_CHECKSIGVERIFY",
        0xae => "OP_CHECKMULTISIG",
        0xaf => "OP_CHECKMULTISIGVERIFY",
        // Locktime and upgradable NOPs
        0xb0 => "OP_NOP1",
        0xb1 => "OP_CHECKLOCKTIMEVERIFY",
        0xb2 => "OP_CHECKSEQUENCEVERIFY",
        0xb3 => "OP_NOP4",
        0xb4 => "OP_NOP5",
        0xb5 => "OP_NOP6",
        0xb6 => "OP_NOP7",
        0xb7 => "OP_NOP8",
        0xb8 => "OP_NOP9",
        0xb9 => "OP_NOP10",
        // Tapscript
        0xba => "OP_CHECKSIGADD",
        0xfd => "OP_PUBKEYHASH",
        0xfe => "OP_PUBKEY",
        0xff => "OP_INVALIDOPCODE",
        _ => return format!("OP_UNKNOWN_0x{:02x}", op),
    };
    name.to_string()
}

/// Protocol recognized from an OP_RETURN payload prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpReturnProtocol {
    Omni,
    Opentimestamps,
    Unknown,
}

/// Extracted OP_RETURN payload
#[derive(Debug, Clone)]
pub struct OpReturnData {
    /// All push payloads concatenated, hex-encoded
    pub data_hex: String,
    /// UTF-8 decoding, only when lossless
    pub data_utf8: Option<String>,
    pub protocol: OpReturnProtocol,
}

/// Extract and tag the data pushed by an OP_RETURN script.
///
/// Successive pushes (direct and PUSHDATA1/2/4) after the leading 0x6a are
/// concatenated; anything else ends the scan. The UTF-8 view is exposed
/// only when decoding is lossless and free of U+FFFD.
pub fn parse_op_return(script: &[u8]) -> OpReturnData {
    let mut data: Vec<u8> = Vec::new();

    if !script.is_empty() && script[0] == 0x6a {
        let mut i = 1;
        while i < script.len() {
            let opcode = script[i];
            i += 1;

            let push_len = match opcode {
                0x01..=0x4b => opcode as usize,
                0x4c => {
                    if i >= script.len() {
                        break;
                    }
                    let n = script[i] as usize;
                    i += 1;
                    n
                }
                0x4d => {
                    if i + 1 >= script.len() {
                        break;
                    }
                    let n = u16::from_le_bytes([script[i], script[i + 1]]) as usize;
                    i += 2;
                    n
                }
                0x4e => {
                    if i + 3 >= script.len() {
                        break;
                    }
                    let n =
                        u32::from_le_bytes([script[i], script[i + 1], script[i + 2], script[i + 3]])
                            as usize;
                    i += 4;
                    n
                }
                _ => break,
            };

            if i + push_len > script.len() {
                break;
            }
            data.extend_from_slice(&script[i..i + push_len]);
            i += push_len;
        }
    }

    let data_utf8 = if data.is_empty() {
        None
    } else {
        std::str::from_utf8(&data)
            .ok()
            .filter(|s| !s.contains('\u{fffd}'))
            .map(str::to_string)
    };

    let protocol = if data.starts_with(&protocol::OMNI_PREFIX) {
        OpReturnProtocol::Omni
    } else if data.starts_with(&protocol::OPENTIMESTAMPS_PREFIX) {
        OpReturnProtocol::Opentimestamps
    } else {
        OpReturnProtocol::Unknown
    };

    OpReturnData {
        data_hex: hex::encode(&data),
        data_utf8,
        protocol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2pkh_script() -> Vec<u8> {
        let mut s = vec![0x76, 0xa9, 0x14];
        s.extend_from_slice(&[0x11; 20]);
        s.extend_from_slice(&[0x88, 0xac]);
        s
    }

    fn p2wpkh_script() -> Vec<u8> {
        let mut s = vec![0x00, 0x14];
        s.extend_from_slice(&[0x22; 20]);
        s
    }

    fn p2tr_script() -> Vec<u8> {
        let mut s = vec![0x51, 0x20];
        s.extend_from_slice(&[0x33; 32]);
        s
    }

    #[test]
    fn test_classify_output_templates() {
        assert_eq!(classify_output_script(&p2pkh_script()), OutputScriptType::P2pkh);

        let mut p2sh = vec![0xa9, 0x14];
        p2sh.extend_from_slice(&[0x11; 20]);
        p2sh.push(0x87);
        assert_eq!(classify_output_script(&p2sh), OutputScriptType::P2sh);

        assert_eq!(classify_output_script(&p2wpkh_script()), OutputScriptType::P2wpkh);

        let mut p2wsh = vec![0x00, 0x20];
        p2wsh.extend_from_slice(&[0x44; 32]);
        assert_eq!(classify_output_script(&p2wsh), OutputScriptType::P2wsh);

        assert_eq!(classify_output_script(&p2tr_script()), OutputScriptType::P2tr);

        assert_eq!(
            classify_output_script(&[0x6a, 0x04, 0x74, 0x65, 0x73, 0x74]),
            OutputScriptType::OpReturn
        );
        assert_eq!(classify_output_script(&[0x6a]), OutputScriptType::OpReturn);

        assert_eq!(classify_output_script(&[]), OutputScriptType::Unknown);
        // Right length, wrong template
        let mut not_p2pkh = p2pkh_script();
        not_p2pkh[24] = 0xad;
        assert_eq!(classify_output_script(&not_p2pkh), OutputScriptType::Unknown);
    }

    #[test]
    fn test_classify_taproot_inputs() {
        let keypath = vec![vec![0xaa; 64]];
        assert_eq!(
            classify_input_script(&[], &keypath, &p2tr_script()),
            InputScriptType::P2trKeypath
        );

        let keypath_sighash = vec![vec![0xaa; 65]];
        assert_eq!(
            classify_input_script(&[], &keypath_sighash, &p2tr_script()),
            InputScriptType::P2trKeypath
        );

        let mut control = vec![0xc1];
        control.extend_from_slice(&[0x55; 32]);
        let scriptpath = vec![vec![0x51], control];
        assert_eq!(
            classify_input_script(&[], &scriptpath, &p2tr_script()),
            InputScriptType::P2trScriptpath
        );

        // 64-byte witness against a non-P2TR prevout is not a keypath spend
        assert_eq!(
            classify_input_script(&[], &keypath, &p2wpkh_script()),
            InputScriptType::Unknown
        );
    }

    #[test]
    fn test_classify_segwit_v0_inputs() {
        let two_items = vec![vec![0x30, 0x45], vec![0x02; 33]];
        assert_eq!(
            classify_input_script(&[], &two_items, &p2wpkh_script()),
            InputScriptType::P2wpkh
        );

        let mut p2wsh = vec![0x00, 0x20];
        p2wsh.extend_from_slice(&[0x44; 32]);
        let stack = vec![vec![], vec![0x51, 0x51, 0x52, 0xae]];
        assert_eq!(
            classify_input_script(&[], &stack, &p2wsh),
            InputScriptType::P2wsh
        );
    }

    #[test]
    fn test_classify_wrapped_segwit_inputs() {
        let mut nested_wpkh = vec![0x16, 0x00, 0x14];
        nested_wpkh.extend_from_slice(&[0x66; 20]);
        let two_items = vec![vec![0x30, 0x45], vec![0x02; 33]];
        assert_eq!(
            classify_input_script(&nested_wpkh, &two_items, &[]),
            InputScriptType::P2shP2wpkh
        );

        let mut nested_wsh = vec![0x22, 0x00, 0x20];
        nested_wsh.extend_from_slice(&[0x77; 32]);
        let stack = vec![vec![0x51]];
        assert_eq!(
            classify_input_script(&nested_wsh, &stack, &[]),
            InputScriptType::P2shP2wsh
        );
    }

    #[test]
    fn test_classify_legacy_inputs() {
        let script_sig = vec![0x01, 0x51];
        assert_eq!(
            classify_input_script(&script_sig, &[], &p2pkh_script()),
            InputScriptType::P2pkh
        );

        // Empty scriptSig and witness fall back to the prevout type
        assert_eq!(
            classify_input_script(&[], &[], &p2pkh_script()),
            InputScriptType::P2pkh
        );
        let mut p2sh = vec![0xa9, 0x14];
        p2sh.extend_from_slice(&[0x11; 20]);
        p2sh.push(0x87);
        assert_eq!(classify_input_script(&[], &[], &p2sh), InputScriptType::P2sh);
        assert_eq!(
            classify_input_script(&[], &[], &[]),
            InputScriptType::Unknown
        );
    }

    #[test]
    fn test_disassemble_p2pkh() {
        let asm = disassemble(&p2pkh_script());
        assert_eq!(
            asm,
            format!(
                "OP_DUP OP_HASH160 OP_PUSHBYTES_20 {} OP_EQUALVERIFY OP_CHECKSIG",
                "11".repeat(20)
            )
        );
    }

    #[test]
    fn test_disassemble_small_ints_and_pushdata() {
        assert_eq!(disassemble(&[]), "");
        assert_eq!(disassemble(&[0x00, 0x51, 0x60, 0x4f]), "OP_0 OP_1 OP_16 OP_1NEGATE");
        assert_eq!(
            disassemble(&[0x4c, 0x02, 0xde, 0xad]),
            "OP_PUSHDATA1 dead"
        );
        assert_eq!(
            disassemble(&[0x4d, 0x03, 0x00, 0x01, 0x02, 0x03]),
            "OP_PUSHDATA2 010203"
        );
        assert_eq!(
            disassemble(&[0x4e, 0x01, 0x00, 0x00, 0x00, 0xff]),
            "OP_PUSHDATA4 ff"
        );
    }

    #[test]
    fn test_disassemble_truncated_pushes() {
        // Direct push claiming more bytes than remain
        assert_eq!(disassemble(&[0x05, 0x01, 0x02]), "OP_PUSHBYTES_5");
        // PUSHDATA1 with no length byte
        assert_eq!(disassemble(&[0x51, 0x4c]), "OP_1 OP_PUSHDATA1");
        // PUSHDATA1 whose payload is cut short
        assert_eq!(disassemble(&[0x4c, 0x04, 0xab]), "OP_PUSHDATA1 ab");
    }

    #[test]
    fn test_disassemble_unknown_opcode() {
        assert_eq!(disassemble(&[0xbb]), "OP_UNKNOWN_0xbb");
        assert_eq!(disassemble(&[0xef]), "OP_UNKNOWN_0xef");
        assert_eq!(disassemble(&[0xba]), "OP_CHECKSIGADD");
    }

    #[test]
    fn test_op_return_utf8_payload() {
        // OP_RETURN OP_PUSHBYTES_8 "sob-2026"
        let script = [
            0x6a, 0x08, 0x73, 0x6f, 0x62, 0x2d, 0x32, 0x30, 0x32, 0x36,
        ];
        let parsed = parse_op_return(&script);
        assert_eq!(parsed.data_hex, "736f622d32303236");
        assert_eq!(parsed.data_utf8.as_deref(), Some("sob-2026"));
        assert_eq!(parsed.protocol, OpReturnProtocol::Unknown);
    }

    #[test]
    fn test_op_return_concatenates_pushes() {
        let script = [0x6a, 0x02, 0x61, 0x62, 0x4c, 0x02, 0x63, 0x64];
        let parsed = parse_op_return(&script);
        assert_eq!(parsed.data_hex, "61626364");
        assert_eq!(parsed.data_utf8.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_op_return_protocol_tags() {
        let omni = [0x6a, 0x06, 0x6f, 0x6d, 0x6e, 0x69, 0x00, 0x01];
        assert_eq!(parse_op_return(&omni).protocol, OpReturnProtocol::Omni);

        let ots = [0x6a, 0x05, 0x01, 0x09, 0xf9, 0x11, 0x02];
        assert_eq!(
            parse_op_return(&ots).protocol,
            OpReturnProtocol::Opentimestamps
        );
    }

    #[test]
    fn test_op_return_invalid_utf8_is_hidden() {
        let script = [0x6a, 0x02, 0xff, 0xfe];
        let parsed = parse_op_return(&script);
        assert_eq!(parsed.data_hex, "fffe");
        assert!(parsed.data_utf8.is_none());
    }

    #[test]
    fn test_op_return_bare() {
        let parsed = parse_op_return(&[0x6a]);
        assert_eq!(parsed.data_hex, "");
        assert!(parsed.data_utf8.is_none());
        assert_eq!(parsed.protocol, OpReturnProtocol::Unknown);
    }
}
