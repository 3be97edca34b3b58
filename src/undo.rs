//! # Undo File Decoding
//!
//! Recovers the spent outputs of a block from its rev*.dat record: CVarInt
//! coin metadata, compressed amounts and the six script-compression cases,
//! plus the best-effort alignment that skips records belonging to
//! neighbouring blocks.

use crate::codec::{decompress_amount, ByteReader};
use crate::config::disk;
use crate::error::{AnalyzerError, AnalyzerResult};
use bitcoin::secp256k1::PublicKey;
use tracing::debug;

/// A spent output reconstructed from the undo stream.
///
/// The undo format stores neither txid nor vout; the block analyzer copies
/// those from the spending input's outpoint.
#[derive(Debug, Clone)]
pub struct UndoPrevout {
    pub value_sats: i64,
    pub script_pubkey: Vec<u8>,
}

/// Locate and decode the undo record whose entry count matches the block.
///
/// rev*.dat numbering tracks blk*.dat, but the first record of rev N may
/// belong to the last block written into blk N−1. Records whose leading
/// CompactSize differs from `want_count` are skipped whole using the size
/// field (`magic + size + payload + trailing hash`); the trailing hash is
/// not verified. Returns one prevout list per non-coinbase transaction.
pub fn find_block_undo(
    reader: &mut ByteReader,
    want_count: u64,
) -> AnalyzerResult<Vec<Vec<UndoPrevout>>> {
    loop {
        let record_start = reader.position();
        if reader.remaining() < disk::MAGIC_LEN + disk::SIZE_LEN {
            return Err(AnalyzerError::UndoNotFound);
        }

        reader.read_bytes(disk::MAGIC_LEN, "undo record magic")?;
        let record_size = reader.read_u32_le("undo record size")? as usize;

        let tx_undo_count = reader.read_compact_size("undo tx count")?;
        if tx_undo_count != want_count {
            debug!(
                found = tx_undo_count,
                want = want_count,
                offset = record_start,
                "skipping undo record for a neighbouring block"
            );
            reader.seek(
                record_start + disk::MAGIC_LEN + disk::SIZE_LEN + record_size + disk::UNDO_HASH_LEN,
            );
            continue;
        }

        let mut block_undo = Vec::new();
        for _ in 0..tx_undo_count {
            let input_count = reader.read_compact_size("undo input count")?;
            let mut tx_undo = Vec::new();
            for _ in 0..input_count {
                tx_undo.push(read_undo_prevout(reader)?);
            }
            block_undo.push(tx_undo);
        }
        return Ok(block_undo);
    }
}

/// Decode one TxInUndo entry (Bitcoin Core's per-coin undo format).
fn read_undo_prevout(reader: &mut ByteReader) -> AnalyzerResult<UndoPrevout> {
    // nCode = height*2 + coinbase flag
    let n_code = reader.read_varint("undo coin code")?;
    let height = n_code >> 1;

    // Pre-segwit undo records carried a per-coin version; modern Core
    // still writes a zero placeholder whenever the height is present
    if height > 0 {
        reader.read_varint("undo coin version")?;
    }

    let compressed_amount = reader.read_varint("undo coin amount")?;
    let value_sats = decompress_amount(compressed_amount);

    let n_size = reader.read_varint("undo script size")?;
    let script_pubkey = decompress_script(reader, n_size)?;

    Ok(UndoPrevout {
        value_sats,
        script_pubkey,
    })
}

/// Expand a compressed scriptPubKey per its nSize selector.
fn decompress_script(reader: &mut ByteReader, n_size: u64) -> AnalyzerResult<Vec<u8>> {
    match n_size {
        // P2PKH: 20-byte pubkey hash
        0 => {
            let hash = reader.read_bytes(20, "undo p2pkh hash")?;
            let mut script = vec![0x76, 0xa9, 0x14];
            script.extend_from_slice(hash);
            script.extend_from_slice(&[0x88, 0xac]);
            Ok(script)
        }

        // P2SH: 20-byte script hash
        1 => {
            let hash = reader.read_bytes(20, "undo p2sh hash")?;
            let mut script = vec![0xa9, 0x14];
            script.extend_from_slice(hash);
            script.push(0x87);
            Ok(script)
        }

        // Compressed P2PK: parity prefix is the selector itself
        2 | 3 => {
            let x = reader.read_bytes(32, "undo p2pk key")?;
            let mut script = vec![0x21, n_size as u8];
            script.extend_from_slice(x);
            script.push(0xac);
            Ok(script)
        }

        // Uncompressed P2PK stored as x-coordinate plus parity (nSize − 2).
        // Recover the full 65-byte key on the curve; a point that fails to
        // decompress falls back to the 33-byte compressed form.
        4 | 5 => {
            let x = reader.read_bytes(32, "undo p2pk key")?;
            let mut compressed = vec![(n_size - 2) as u8];
            compressed.extend_from_slice(x);

            match PublicKey::from_slice(&compressed) {
                Ok(key) => {
                    let mut script = vec![0x41];
                    script.extend_from_slice(&key.serialize_uncompressed());
                    script.push(0xac);
                    Ok(script)
                }
                Err(_) => {
                    let mut script = vec![0x21];
                    script.extend_from_slice(&compressed);
                    script.push(0xac);
                    Ok(script)
                }
            }
        }

        // Raw script of nSize − 6 bytes
        _ => {
            let len = (n_size - 6) as usize;
            Ok(reader.read_bytes(len, "undo raw script")?.to_vec())
        }
    }
}
