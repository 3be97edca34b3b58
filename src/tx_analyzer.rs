//! # Transaction Analyzer
//!
//! Turns a fixture (raw transaction plus its prevouts) into a fully
//! classified record: identity, sizes, per-input and per-output breakdowns,
//! fee figures, timelock interpretation and policy warnings.

use crate::address::address_from_script;
use crate::codec::decode_hex;
use crate::config::policy;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::fixture::{Fixture, NetworkTag, PrevoutRef};
use crate::script::{
    classify_input_script, classify_output_script, disassemble, parse_op_return, InputScriptType,
    OpReturnProtocol, OutputScriptType,
};
use crate::timelock::{is_rbf_signaling, locktime_type, LocktimeType, RelativeTimelock};
use crate::wire::Transaction;
use serde::Serialize;
use std::collections::HashMap;

/// Complete analysis result for one transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub ok: bool,
    pub network: NetworkTag,
    pub segwit: bool,
    pub txid: String,
    pub wtxid: Option<String>,
    pub version: i32,
    pub locktime: u32,
    pub size_bytes: usize,
    pub weight: usize,
    pub vbytes: usize,
    pub fee_sats: i64,
    pub fee_rate_sat_vb: f64,
    pub total_input_sats: i64,
    pub total_output_sats: i64,
    pub rbf_signaling: bool,
    pub locktime_type: LocktimeType,
    pub locktime_value: u32,
    pub vin_count: usize,
    pub vout_count: usize,
    pub vout_script_types: Vec<OutputScriptType>,
    pub segwit_savings: Option<SegwitSavings>,
    pub vin: Vec<InputRecord>,
    pub vout: Vec<OutputRecord>,
    pub warnings: Vec<Warning>,
}

/// Analysis of a single input
#[derive(Debug, Clone, Serialize)]
pub struct InputRecord {
    pub txid: String,
    pub vout: u32,
    pub sequence: u32,
    pub script_sig_hex: String,
    pub script_asm: String,
    /// Witness stack items as hex; empty items stay as empty strings
    pub witness: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness_script_asm: Option<String>,
    pub script_type: InputScriptType,
    pub address: Option<String>,
    pub prevout: PrevoutSummary,
    pub relative_timelock: RelativeTimelock,
}

/// The previous output resolved for an input
#[derive(Debug, Clone, Default, Serialize)]
pub struct PrevoutSummary {
    pub value_sats: i64,
    pub script_pubkey_hex: String,
}

/// Analysis of a single output
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub n: usize,
    pub value_sats: i64,
    pub script_pubkey_hex: String,
    pub script_asm: String,
    pub script_type: OutputScriptType,
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_return_data_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_return_data_utf8: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_return_protocol: Option<OpReturnProtocol>,
}

/// Witness-discount accounting, present only for SegWit transactions
#[derive(Debug, Clone, Serialize)]
pub struct SegwitSavings {
    pub witness_bytes: usize,
    pub non_witness_bytes: usize,
    pub total_bytes: usize,
    pub weight_actual: usize,
    pub weight_if_legacy: usize,
    pub savings_pct: f64,
}

/// Policy warning codes, emitted in a fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    HighFee,
    DustOutput,
    UnknownOutputScript,
    RbfSignaling,
}

/// A `{code}` warning object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
}

/// Main transaction analyzer
pub struct TransactionAnalyzer {
    network: NetworkTag,
}

impl TransactionAnalyzer {
    /// Create a new analyzer for the given network
    pub fn new(network: NetworkTag) -> Self {
        Self { network }
    }

    /// Analyze a caller-supplied fixture
    pub fn analyze_fixture(fixture: &Fixture) -> AnalyzerResult<TransactionRecord> {
        Self::new(fixture.network).analyze(&fixture.raw_tx, &fixture.prevouts)
    }

    /// Analyze a raw transaction hex against its prevouts
    pub fn analyze(
        &self,
        raw_tx_hex: &str,
        prevouts: &[PrevoutRef],
    ) -> AnalyzerResult<TransactionRecord> {
        let raw = decode_hex(raw_tx_hex)?;
        let tx = Transaction::decode_standalone(&raw)?;

        let prevout_index = Self::index_prevouts(prevouts)?;
        Self::check_prevout_coverage(&tx, &prevout_index)?;

        let segwit = tx.has_witness();
        let txid = tx.txid();
        let wtxid = segwit.then(|| tx.wtxid());

        let total_size = tx.total_size();
        let base_size = tx.base_size();
        let weight = tx.weight();
        let vbytes = tx.vbytes();

        let mut vin = Vec::with_capacity(tx.inputs.len());
        let mut sequences = Vec::with_capacity(tx.inputs.len());
        let mut total_input_sats: i64 = 0;

        for input in &tx.inputs {
            let prev_txid = input.prev_txid_hex();
            let prevout = if input.is_coinbase() {
                PrevoutSummary::default()
            } else {
                let resolved = prevout_index[&(prev_txid.clone(), input.prev_vout)];
                PrevoutSummary {
                    value_sats: resolved.value_sats,
                    script_pubkey_hex: resolved.script_pubkey_hex.clone(),
                }
            };
            total_input_sats += prevout.value_sats;

            let prevout_script = decode_hex(&prevout.script_pubkey_hex)?;
            let script_type =
                classify_input_script(&input.script_sig, &input.witness, &prevout_script);

            let witness: Vec<String> = input.witness.iter().map(hex::encode).collect();

            // For wrapped and native script-hash spends the last witness
            // item is the witnessScript itself
            let witness_script_asm = if script_type.has_witness_script() {
                input
                    .witness
                    .last()
                    .filter(|item| !item.is_empty())
                    .map(|item| disassemble(item))
            } else {
                None
            };

            sequences.push(input.sequence);

            vin.push(InputRecord {
                txid: prev_txid,
                vout: input.prev_vout,
                sequence: input.sequence,
                script_sig_hex: hex::encode(&input.script_sig),
                script_asm: disassemble(&input.script_sig),
                witness,
                witness_script_asm,
                script_type,
                address: address_from_script(&prevout_script, self.network),
                prevout,
                relative_timelock: RelativeTimelock::from_sequence(input.sequence),
            });
        }

        let mut vout = Vec::with_capacity(tx.outputs.len());
        let mut total_output_sats: i64 = 0;

        for (n, output) in tx.outputs.iter().enumerate() {
            total_output_sats += output.value_sats;

            let script_type = classify_output_script(&output.script_pubkey);
            let op_return = (script_type == OutputScriptType::OpReturn)
                .then(|| parse_op_return(&output.script_pubkey));

            vout.push(OutputRecord {
                n,
                value_sats: output.value_sats,
                script_pubkey_hex: hex::encode(&output.script_pubkey),
                script_asm: disassemble(&output.script_pubkey),
                script_type,
                address: address_from_script(&output.script_pubkey, self.network),
                op_return_data_hex: op_return.as_ref().map(|d| d.data_hex.clone()),
                op_return_data_utf8: op_return.as_ref().and_then(|d| d.data_utf8.clone()),
                op_return_protocol: op_return.as_ref().map(|d| d.protocol),
            });
        }

        let fee_sats = total_input_sats - total_output_sats;
        let fee_rate_sat_vb = round_two_decimals(fee_sats as f64 / vbytes as f64);

        let rbf_signaling = is_rbf_signaling(&sequences);

        let segwit_savings = segwit.then(|| {
            let weight_if_legacy = total_size * 4;
            SegwitSavings {
                witness_bytes: total_size - base_size,
                non_witness_bytes: base_size,
                total_bytes: total_size,
                weight_actual: weight,
                weight_if_legacy,
                savings_pct: round_two_decimals(
                    (1.0 - weight as f64 / weight_if_legacy as f64) * 100.0,
                ),
            }
        });

        let warnings = Self::generate_warnings(fee_sats, fee_rate_sat_vb, rbf_signaling, &vout);

        Ok(TransactionRecord {
            ok: true,
            network: self.network,
            segwit,
            txid,
            wtxid,
            version: tx.version,
            locktime: tx.locktime,
            size_bytes: total_size,
            weight,
            vbytes,
            fee_sats,
            fee_rate_sat_vb,
            total_input_sats,
            total_output_sats,
            rbf_signaling,
            locktime_type: locktime_type(tx.locktime),
            locktime_value: tx.locktime,
            vin_count: vin.len(),
            vout_count: vout.len(),
            vout_script_types: vout.iter().map(|o| o.script_type).collect(),
            segwit_savings,
            vin,
            vout,
            warnings,
        })
    }

    /// Index prevouts by (txid, vout), rejecting duplicates
    fn index_prevouts(
        prevouts: &[PrevoutRef],
    ) -> AnalyzerResult<HashMap<(String, u32), &PrevoutRef>> {
        let mut index = HashMap::new();
        for prevout in prevouts {
            let key = (prevout.txid.clone(), prevout.vout);
            if index.insert(key, prevout).is_some() {
                return Err(AnalyzerError::DuplicatePrevout {
                    txid: prevout.txid.clone(),
                    vout: prevout.vout,
                });
            }
        }
        Ok(index)
    }

    /// Every non-coinbase input must resolve to exactly one prevout
    fn check_prevout_coverage(
        tx: &Transaction,
        index: &HashMap<(String, u32), &PrevoutRef>,
    ) -> AnalyzerResult<()> {
        for input in &tx.inputs {
            if input.is_coinbase() {
                continue;
            }
            let txid = input.prev_txid_hex();
            if !index.contains_key(&(txid.clone(), input.prev_vout)) {
                return Err(AnalyzerError::MissingPrevout {
                    txid,
                    vout: input.prev_vout,
                });
            }
        }
        Ok(())
    }

    /// Policy warnings, in the fixed enumeration order
    fn generate_warnings(
        fee_sats: i64,
        fee_rate_sat_vb: f64,
        rbf_signaling: bool,
        vout: &[OutputRecord],
    ) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if fee_sats > policy::HIGH_FEE_SATS || fee_rate_sat_vb > policy::HIGH_FEE_RATE_SAT_VB {
            warnings.push(Warning {
                code: WarningCode::HighFee,
            });
        }

        if vout.iter().any(|o| {
            o.script_type != OutputScriptType::OpReturn
                && o.value_sats < policy::DUST_THRESHOLD_SATS
        }) {
            warnings.push(Warning {
                code: WarningCode::DustOutput,
            });
        }

        if vout
            .iter()
            .any(|o| o.script_type == OutputScriptType::Unknown)
        {
            warnings.push(Warning {
                code: WarningCode::UnknownOutputScript,
            });
        }

        if rbf_signaling {
            warnings.push(Warning {
                code: WarningCode::RbfSignaling,
            });
        }

        warnings
    }
}

/// Two-decimal output rounding; internal math stays in floating point
fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{TxInput, TxOutput};

    fn p2pkh_script() -> Vec<u8> {
        let mut s = vec![0x76, 0xa9, 0x14];
        s.extend_from_slice(&[0x42; 20]);
        s.extend_from_slice(&[0x88, 0xac]);
        s
    }

    fn p2wpkh_script() -> Vec<u8> {
        let mut s = vec![0x00, 0x14];
        s.extend_from_slice(&[0x42; 20]);
        s
    }

    fn prevout_for(input: &TxInput, value_sats: i64, script: &[u8]) -> PrevoutRef {
        PrevoutRef {
            txid: input.prev_txid_hex(),
            vout: input.prev_vout,
            value_sats,
            script_pubkey_hex: hex::encode(script),
        }
    }

    fn spend_input(script_sig: Vec<u8>, sequence: u32, witness: Vec<Vec<u8>>) -> TxInput {
        TxInput {
            prev_txid: [0x11; 32],
            prev_vout: 0,
            script_sig,
            sequence,
            witness,
        }
    }

    fn analyze(tx: &Transaction, prevouts: Vec<PrevoutRef>) -> AnalyzerResult<TransactionRecord> {
        TransactionAnalyzer::new(NetworkTag::Mainnet).analyze(&hex::encode(tx.serialize()), &prevouts)
    }

    #[test]
    fn test_legacy_p2pkh_spend() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 1_500,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        assert!(record.ok);
        assert!(!record.segwit);
        assert!(record.wtxid.is_none());
        assert!(record.segwit_savings.is_none());
        assert_eq!(record.fee_sats, 500);
        assert_eq!(record.total_input_sats, 2_000);
        assert_eq!(record.total_output_sats, 1_500);
        assert_eq!(record.vin[0].script_type, InputScriptType::P2pkh);
        assert_eq!(record.vout[0].script_type, OutputScriptType::P2pkh);
        assert_eq!(record.vout[0].n, 0);
        assert!(record.vin[0].address.is_some());
        assert!(record.warnings.is_empty());
        assert_eq!(record.weight, record.size_bytes * 4);
    }

    #[test]
    fn test_segwit_p2wpkh_rbf_spend() {
        let input = spend_input(
            Vec::new(),
            0xffff_fffd,
            vec![vec![0x30; 71], vec![0x02; 33]],
        );
        let prevouts = vec![prevout_for(&input, 3_000, &p2wpkh_script())];
        let tx = Transaction {
            version: 2,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 2_000,
                script_pubkey: p2wpkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        assert!(record.segwit);
        assert!(record.wtxid.is_some());
        assert_ne!(record.wtxid.as_deref(), Some(record.txid.as_str()));
        assert!(record.rbf_signaling);
        assert_eq!(record.locktime_type, LocktimeType::None);
        assert_eq!(record.vin[0].script_type, InputScriptType::P2wpkh);
        assert_eq!(
            record.warnings,
            vec![Warning {
                code: WarningCode::RbfSignaling
            }]
        );
        // Sequence 0xfffffffd signals RBF but carries no BIP68 lock
        assert!(!record.vin[0].relative_timelock.enabled);

        let savings = record.segwit_savings.unwrap();
        assert_eq!(savings.total_bytes, record.size_bytes);
        assert_eq!(savings.weight_actual, record.weight);
        assert_eq!(savings.weight_if_legacy, record.size_bytes * 4);
        assert!(savings.savings_pct > 0.0);
    }

    #[test]
    fn test_op_return_output() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevouts = vec![prevout_for(&input, 10_000, &p2pkh_script())];
        let op_return_script =
            hex::decode("6a08736f622d32303236").unwrap();
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![
                TxOutput {
                    value_sats: 0,
                    script_pubkey: op_return_script,
                },
                TxOutput {
                    value_sats: 9_000,
                    script_pubkey: p2pkh_script(),
                },
            ],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        let op_return = &record.vout[0];
        assert_eq!(op_return.script_type, OutputScriptType::OpReturn);
        assert_eq!(op_return.op_return_data_hex.as_deref(), Some("736f622d32303236"));
        assert_eq!(op_return.op_return_data_utf8.as_deref(), Some("sob-2026"));
        assert_eq!(op_return.op_return_protocol, Some(OpReturnProtocol::Unknown));
        assert!(op_return.address.is_none());
        // Zero-value OP_RETURN is not dust
        assert!(!record
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::DustOutput));
    }

    #[test]
    fn test_dust_output_warning() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 545,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        assert!(record
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::DustOutput));
    }

    #[test]
    fn test_high_fee_warning() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 500_000,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        assert_eq!(record.fee_sats, 1_500_000);
        assert!(record
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::HighFee));
    }

    #[test]
    fn test_warning_order_is_fixed() {
        let input = spend_input(vec![0x01, 0x00], 0, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![
                TxOutput {
                    value_sats: 100,
                    script_pubkey: vec![0x51, 0x51],
                },
                TxOutput {
                    value_sats: 200,
                    script_pubkey: p2pkh_script(),
                },
            ],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        let codes: Vec<WarningCode> = record.warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec![
                WarningCode::HighFee,
                WarningCode::DustOutput,
                WarningCode::UnknownOutputScript,
                WarningCode::RbfSignaling,
            ]
        );
    }

    #[test]
    fn test_witness_script_asm_for_p2wsh() {
        let witness_script = vec![0x51, 0xac];
        let mut p2wsh = vec![0x00, 0x20];
        p2wsh.extend_from_slice(&[0x44; 32]);

        let input = spend_input(
            Vec::new(),
            0xffff_ffff,
            vec![vec![0x30; 71], witness_script],
        );
        let prevouts = vec![prevout_for(&input, 5_000, &p2wsh)];
        let tx = Transaction {
            version: 2,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 4_000,
                script_pubkey: p2wpkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        assert_eq!(record.vin[0].script_type, InputScriptType::P2wsh);
        assert_eq!(
            record.vin[0].witness_script_asm.as_deref(),
            Some("OP_1 OP_CHECKSIG")
        );
    }

    #[test]
    fn test_missing_prevout_rejected() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 1_000,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let result = analyze(&tx, Vec::new());
        assert!(matches!(result, Err(AnalyzerError::MissingPrevout { .. })));
    }

    #[test]
    fn test_duplicate_prevout_rejected() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevout = prevout_for(&input, 2_000, &p2pkh_script());
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 1_000,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let result = analyze(&tx, vec![prevout.clone(), prevout]);
        assert!(matches!(result, Err(AnalyzerError::DuplicatePrevout { .. })));
    }

    #[test]
    fn test_coinbase_needs_no_prevouts() {
        let tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                prev_txid: [0u8; 32],
                prev_vout: 0xffff_ffff,
                script_sig: vec![0x03, 0x10, 0x27, 0x00],
                sequence: 0xffff_ffff,
                witness: Vec::new(),
            }],
            outputs: vec![TxOutput {
                value_sats: 625_000_000,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, Vec::new()).unwrap();
        assert_eq!(record.total_input_sats, 0);
        assert_eq!(record.fee_sats, -625_000_000);
        assert_eq!(record.vin[0].prevout.value_sats, 0);
        assert!(record.vin[0].address.is_none());
    }

    #[test]
    fn test_fee_rate_rounding() {
        let input = spend_input(vec![0x01, 0x00], 0xffff_ffff, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 1_103,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 0,
        };

        let record = analyze(&tx, prevouts).unwrap();
        let exact = record.fee_sats as f64 / record.vbytes as f64;
        assert!((record.fee_rate_sat_vb - exact).abs() < 0.02);
        // Exactly two decimals survive the rounding
        assert_eq!(
            record.fee_rate_sat_vb,
            (exact * 100.0).round() / 100.0
        );
    }

    #[test]
    fn test_record_json_shape() {
        let input = spend_input(vec![0x01, 0x00], 0x0000_0090, Vec::new());
        let prevouts = vec![prevout_for(&input, 2_000, &p2pkh_script())];
        let tx = Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![TxOutput {
                value_sats: 1_500,
                script_pubkey: p2pkh_script(),
            }],
            locktime: 750_000,
        };

        let record = analyze(&tx, prevouts).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        // Legacy transactions keep an explicit null wtxid
        assert!(json["wtxid"].is_null());
        assert_eq!(json["locktime_type"], "block_height");
        assert_eq!(json["vin"][0]["script_type"], "p2pkh");
        assert_eq!(json["vin"][0]["relative_timelock"]["type"], "blocks");
        assert_eq!(json["vin"][0]["relative_timelock"]["value"], 144);
        // Non-OP_RETURN outputs omit the op_return fields entirely
        assert!(json["vout"][0].get("op_return_data_hex").is_none());
        assert_eq!(json["vout_script_types"][0], "p2pkh");
    }
}
