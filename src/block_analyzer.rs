//! # Block Analyzer
//!
//! Reads a blk*.dat record together with its rev*.dat undo data, verifies
//! the Merkle root, reconstructs every spent prevout and runs the
//! transaction analyzer over the whole block, producing one aggregate
//! record. Only the first block of the file is processed.

use crate::codec::{double_sha256, reversed_hex, xor_decode, ByteReader};
use crate::config::disk;
use crate::error::{AnalyzerError, AnalyzerResult, ErrorRecord};
use crate::fixture::{Fixture, NetworkTag, PrevoutRef};
use crate::script::OutputScriptType;
use crate::tx_analyzer::{TransactionAnalyzer, TransactionRecord};
use crate::undo::find_block_undo;
use crate::wire::Transaction;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Complete analysis result for one block
#[derive(Debug, Clone, Serialize)]
pub struct BlockRecord {
    pub ok: bool,
    pub mode: String,
    pub block_header: BlockHeaderRecord,
    pub tx_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<CoinbaseRecord>,
    pub transactions: Vec<TransactionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_stats: Option<BlockStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

/// Decoded 80-byte block header, hashes in display order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlockHeaderRecord {
    pub version: i32,
    pub prev_block_hash: String,
    pub merkle_root: String,
    pub merkle_root_valid: bool,
    pub timestamp: u32,
    pub bits: String,
    pub nonce: u32,
    pub block_hash: String,
}

/// Coinbase transaction summary
#[derive(Debug, Clone, Serialize)]
pub struct CoinbaseRecord {
    pub bip34_height: i64,
    pub coinbase_script_hex: String,
    pub total_output_sats: i64,
}

/// Block-level aggregates over all analyzed transactions
#[derive(Debug, Clone, Serialize)]
pub struct BlockStats {
    pub total_fees_sats: i64,
    pub total_weight: usize,
    pub avg_fee_rate_sat_vb: f64,
    pub script_type_summary: BTreeMap<OutputScriptType, usize>,
}

/// Main block analyzer
pub struct BlockAnalyzer {
    network: NetworkTag,
}

impl BlockAnalyzer {
    /// Create a new analyzer; the network drives address encoding
    pub fn new(network: NetworkTag) -> Self {
        Self { network }
    }

    /// Analyze the first block of a blk file with its undo and XOR key files
    pub fn analyze_files(
        &self,
        blk_path: &Path,
        rev_path: &Path,
        key_path: &Path,
    ) -> AnalyzerResult<BlockRecord> {
        let key = read_file(key_path)?;
        let blk = xor_decode(&read_file(blk_path)?, &key);
        let rev = xor_decode(&read_file(rev_path)?, &key);
        debug!(
            blk_bytes = blk.len(),
            rev_bytes = rev.len(),
            key_bytes = key.len(),
            "loaded block and undo files"
        );
        self.analyze_bytes(&blk, &rev)
    }

    /// Analyze already de-obfuscated blk and rev byte streams
    pub fn analyze_bytes(&self, blk: &[u8], rev: &[u8]) -> AnalyzerResult<BlockRecord> {
        let mut reader = ByteReader::new(blk);

        // Outer framing: network magic, then the record size
        reader.read_bytes(disk::MAGIC_LEN, "block record magic")?;
        reader.read_u32_le("block record size")?;

        let header_bytes = reader.read_bytes(disk::HEADER_LEN, "block header")?;
        let block_hash = reversed_hex(&double_sha256(header_bytes));

        let mut header_reader = ByteReader::new(header_bytes);
        let version = header_reader.read_i32_le("header version")?;
        let prev_block_hash = header_reader.read_hash("header prev hash")?;
        let merkle_root = header_reader.read_hash("header merkle root")?;
        let timestamp = header_reader.read_u32_le("header timestamp")?;
        let bits = header_reader.read_u32_le("header bits")?;
        let nonce = header_reader.read_u32_le("header nonce")?;

        let tx_count = reader.read_compact_size("block tx count")? as usize;
        if tx_count == 0 {
            return Err(AnalyzerError::truncated("block transactions"));
        }

        let mut transactions = Vec::with_capacity(tx_count);
        for _ in 0..tx_count {
            transactions.push(Transaction::decode(&mut reader)?);
        }

        let mut header_record = BlockHeaderRecord {
            version,
            prev_block_hash: reversed_hex(&prev_block_hash),
            merkle_root: reversed_hex(&merkle_root),
            merkle_root_valid: false,
            timestamp,
            bits: format!("{:08x}", bits),
            nonce,
            block_hash: block_hash.clone(),
        };

        let txid_hashes: Vec<[u8; 32]> = transactions.iter().map(|tx| tx.txid_bytes()).collect();
        if compute_merkle_root(&txid_hashes) != merkle_root {
            let error = AnalyzerError::InvalidMerkleRoot { block_hash };
            return Ok(Self::failed_record(header_record, tx_count, &error));
        }
        header_record.merkle_root_valid = true;

        let mut rev_reader = ByteReader::new(rev);
        let undo = match find_block_undo(&mut rev_reader, tx_count as u64 - 1) {
            Ok(undo) => undo,
            Err(err @ AnalyzerError::UndoNotFound) => {
                return Ok(Self::failed_record(header_record, tx_count, &err));
            }
            Err(other) => {
                let error = AnalyzerError::undo(other.to_string());
                return Ok(Self::failed_record(header_record, tx_count, &error));
            }
        };

        let coinbase_tx = &transactions[0];
        let coinbase_script = coinbase_tx
            .inputs
            .first()
            .map(|input| input.script_sig.clone())
            .unwrap_or_default();
        let coinbase = CoinbaseRecord {
            bip34_height: extract_bip34_height(&coinbase_script),
            coinbase_script_hex: hex::encode(&coinbase_script),
            total_output_sats: coinbase_tx.outputs.iter().map(|o| o.value_sats).sum(),
        };

        let mut tx_records = Vec::with_capacity(tx_count);
        let mut total_fees_sats: i64 = 0;
        let mut total_weight: usize = 0;
        let mut script_type_summary: BTreeMap<OutputScriptType, usize> = BTreeMap::new();

        for (i, tx) in transactions.iter().enumerate() {
            let prevouts = if i == 0 {
                Vec::new()
            } else {
                match Self::prevouts_for(tx, &undo[i - 1], i) {
                    Ok(prevouts) => prevouts,
                    Err(err) => {
                        return Ok(Self::failed_record(header_record, tx_count, &err));
                    }
                }
            };

            let fixture = Fixture {
                network: self.network,
                raw_tx: hex::encode(tx.serialize()),
                prevouts,
            };
            // A misaligned undo record can surface here as a missing or
            // duplicate prevout; those failures keep the derived header too
            let record = match TransactionAnalyzer::analyze_fixture(&fixture) {
                Ok(record) => record,
                Err(err) => {
                    return Ok(Self::failed_record(header_record, tx_count, &err));
                }
            };

            if i > 0 {
                total_fees_sats += record.fee_sats;
            }
            total_weight += record.weight;
            for output in &record.vout {
                *script_type_summary.entry(output.script_type).or_insert(0) += 1;
            }
            tx_records.push(record);
        }

        let avg_fee_rate_sat_vb = if total_weight > 0 {
            let total_vbytes = (total_weight + 3) / 4;
            total_fees_sats as f64 / total_vbytes as f64
        } else {
            0.0
        };

        Ok(BlockRecord {
            ok: true,
            mode: "block".to_string(),
            block_header: header_record,
            tx_count,
            coinbase: Some(coinbase),
            transactions: tx_records,
            block_stats: Some(BlockStats {
                total_fees_sats,
                total_weight,
                avg_fee_rate_sat_vb,
                script_type_summary,
            }),
            error: None,
        })
    }

    /// Pair a transaction's inputs with its reconstructed prevouts,
    /// attaching the outpoint keys the undo format does not store
    fn prevouts_for(
        tx: &Transaction,
        undo: &[crate::undo::UndoPrevout],
        tx_index: usize,
    ) -> AnalyzerResult<Vec<PrevoutRef>> {
        if undo.len() != tx.inputs.len() {
            return Err(AnalyzerError::undo(format!(
                "tx {} has {} inputs but {} undo entries",
                tx_index,
                tx.inputs.len(),
                undo.len()
            )));
        }
        Ok(tx
            .inputs
            .iter()
            .zip(undo)
            .map(|(input, prevout)| PrevoutRef {
                txid: input.prev_txid_hex(),
                vout: input.prev_vout,
                value_sats: prevout.value_sats,
                script_pubkey_hex: hex::encode(&prevout.script_pubkey),
            })
            .collect())
    }

    /// Structured failure record carrying the header derived so far
    fn failed_record(
        header: BlockHeaderRecord,
        tx_count: usize,
        error: &AnalyzerError,
    ) -> BlockRecord {
        BlockRecord {
            ok: false,
            mode: "block".to_string(),
            block_header: header,
            tx_count,
            coinbase: None,
            transactions: Vec::new(),
            block_stats: None,
            error: Some(error.to_record()),
        }
    }
}

/// Bottom-up pairwise Merkle reduction; odd nodes pair with themselves
fn compute_merkle_root(hashes: &[[u8; 32]]) -> [u8; 32] {
    if hashes.is_empty() {
        return [0u8; 32];
    }
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let mut combined = [0u8; 64];
            combined[..32].copy_from_slice(&pair[0]);
            combined[32..].copy_from_slice(pair.get(1).unwrap_or(&pair[0]));
            next.push(double_sha256(&combined));
        }
        level = next;
    }
    level[0]
}

/// Decode the BIP34 height from a coinbase scriptSig: a leading push of
/// 1..=8 bytes read little-endian. Malformed scripts yield 0.
fn extract_bip34_height(script_sig: &[u8]) -> i64 {
    if script_sig.len() < 2 {
        return 0;
    }
    let push_len = script_sig[0] as usize;
    if push_len < 1 || push_len > 8 || 1 + push_len > script_sig.len() {
        return 0;
    }
    let mut height: i64 = 0;
    for (i, &b) in script_sig[1..=push_len].iter().enumerate() {
        height |= (b as i64) << (8 * i);
    }
    height
}

fn read_file(path: &Path) -> AnalyzerResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnalyzerError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            AnalyzerError::from(e)
        }
    })
}
