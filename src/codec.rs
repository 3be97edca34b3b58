//! # Byte Codec
//!
//! Low-level decoding primitives shared by the transaction, block and undo
//! parsers: a bounds-checked cursor, the two distinct variable-integer
//! encodings (CompactSize for consensus serialization, CVarInt for undo
//! files), double-SHA256, XOR de-obfuscation and Bitcoin Core's compressed
//! amount scheme.

use crate::error::{AnalyzerError, AnalyzerResult};
use sha2::{Digest, Sha256};

/// Bounds-checked cursor over an in-memory byte buffer.
///
/// Every read fails with `TRUNCATED` (naming the field being read) when the
/// buffer ends mid-value. Positions may be seeked past the end; the next
/// read reports the truncation.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute offset
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Bytes left before the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read exactly `n` bytes, or fail with `TRUNCATED`
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> AnalyzerResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(AnalyzerError::truncated(context));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self, context: &'static str) -> AnalyzerResult<u8> {
        Ok(self.read_bytes(1, context)?[0])
    }

    pub fn read_u16_le(&mut self, context: &'static str) -> AnalyzerResult<u16> {
        let b = self.read_bytes(2, context)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self, context: &'static str) -> AnalyzerResult<u32> {
        let b = self.read_bytes(4, context)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32_le(&mut self, context: &'static str) -> AnalyzerResult<i32> {
        Ok(self.read_u32_le(context)? as i32)
    }

    pub fn read_u64_le(&mut self, context: &'static str) -> AnalyzerResult<u64> {
        let b = self.read_bytes(8, context)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read a 32-byte hash
    pub fn read_hash(&mut self, context: &'static str) -> AnalyzerResult<[u8; 32]> {
        let b = self.read_bytes(32, context)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(b);
        Ok(hash)
    }

    /// Read a Bitcoin CompactSize length prefix.
    ///
    /// One byte below 0xfd is the value itself; 0xfd/0xfe/0xff introduce a
    /// 2/4/8-byte little-endian value. Used in transaction and block
    /// serialization, never in undo files.
    pub fn read_compact_size(&mut self, context: &'static str) -> AnalyzerResult<u64> {
        let first = self.read_u8(context)?;
        match first {
            0xfd => Ok(u64::from(self.read_u16_le(context)?)),
            0xfe => Ok(u64::from(self.read_u32_le(context)?)),
            0xff => self.read_u64_le(context),
            _ => Ok(u64::from(first)),
        }
    }

    /// Read Bitcoin Core's CVarInt, the variable-length integer used in
    /// undo (rev*.dat) files. This is NOT CompactSize.
    ///
    /// Each byte contributes its low 7 bits, big-endian; a set top bit
    /// means more bytes follow and adds an implicit +1 per continuation.
    pub fn read_varint(&mut self, context: &'static str) -> AnalyzerResult<u64> {
        let mut n: u64 = 0;
        loop {
            let b = self.read_u8(context)?;
            n = n.wrapping_shl(7) | u64::from(b & 0x7f);
            if b & 0x80 == 0 {
                return Ok(n);
            }
            n = n.wrapping_add(1);
        }
    }
}

/// Append a CompactSize encoding of `val` to `out`
pub fn write_compact_size(out: &mut Vec<u8>, val: u64) {
    if val < 0xfd {
        out.push(val as u8);
    } else if val <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(val as u16).to_le_bytes());
    } else if val <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(val as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&val.to_le_bytes());
    }
}

/// Double SHA256 (txids, wtxids, block hashes, Merkle nodes)
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Hex of a hash in display order (byte-reversed from internal order)
pub fn reversed_hex(bytes: &[u8]) -> String {
    let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
    hex::encode(reversed)
}

/// Undo the XOR obfuscation Bitcoin Core applies to blk/rev files.
///
/// An empty or all-zero key is a no-op; otherwise every byte is XORed with
/// the key byte at its offset modulo the key length.
pub fn xor_decode(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() || key.iter().all(|&b| b == 0) {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect()
}

/// Decompress a Bitcoin Core compressed amount into satoshis.
///
/// Exact inverse of `CompressAmount` in Bitcoin Core's compressor: the
/// encoding factors out trailing decimal zeros and the lowest non-zero
/// digit. Any deviation here corrupts every reconstructed prevout.
pub fn decompress_amount(x: u64) -> i64 {
    if x == 0 {
        return 0;
    }
    let mut x = x - 1;
    let e = x % 10;
    x /= 10;
    let mut n: u64;
    if e < 9 {
        let d = (x % 9) + 1;
        x /= 9;
        n = x.wrapping_mul(10).wrapping_add(d);
        for _ in 0..e {
            n = n.wrapping_mul(10);
        }
    } else {
        n = x.wrapping_add(1);
        for _ in 0..9 {
            n = n.wrapping_mul(10);
        }
    }
    n as i64
}

/// Decode a hex string, mapping failures to `INVALID_HEX`
pub fn decode_hex(input: &str) -> AnalyzerResult<Vec<u8>> {
    hex::decode(input).map_err(|e| AnalyzerError::hex(e.to_string()))
}
