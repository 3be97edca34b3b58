//! # Configuration Constants
//!
//! This module centralizes the policy constants and thresholds used
//! throughout the analyzer.

/// Transaction policy thresholds
pub mod policy {
    /// Dust threshold in satoshis (outputs below this trigger DUST_OUTPUT)
    pub const DUST_THRESHOLD_SATS: i64 = 546;

    /// Absolute fee above which HIGH_FEE is raised
    pub const HIGH_FEE_SATS: i64 = 1_000_000;

    /// Fee rate (sat/vB) above which HIGH_FEE is raised
    pub const HIGH_FEE_RATE_SAT_VB: f64 = 200.0;
}

/// Consensus-format constants
pub mod consensus {
    /// Locktime values below this are block heights, above are timestamps
    pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

    /// Sequence values >= this neither signal RBF nor carry a BIP68 lock
    pub const SEQUENCE_FINAL_THRESHOLD: u32 = 0xffff_fffe;

    /// BIP68: bit 31 disables the relative timelock
    pub const SEQUENCE_DISABLE_FLAG: u32 = 1 << 31;

    /// BIP68: bit 22 selects time-based (vs block-based) locks
    pub const SEQUENCE_TIME_TYPE_FLAG: u32 = 1 << 22;

    /// BIP68: low 16 bits hold the lock value
    pub const SEQUENCE_VALUE_MASK: u32 = 0xffff;

    /// BIP68 time-based locks count in 512-second units
    pub const SEQUENCE_TIME_GRANULARITY: u32 = 512;

    /// Outpoint index marking a coinbase input
    pub const COINBASE_VOUT: u32 = 0xffff_ffff;
}

/// OP_RETURN protocol prefixes
pub mod protocol {
    /// Omni Layer payloads start with "omni"
    pub const OMNI_PREFIX: [u8; 4] = [0x6f, 0x6d, 0x6e, 0x69];

    /// OpenTimestamps payloads start with this tag
    pub const OPENTIMESTAMPS_PREFIX: [u8; 5] = [0x01, 0x09, 0xf9, 0x11, 0x02];
}

/// On-disk record framing (blk*.dat / rev*.dat)
pub mod disk {
    /// Bytes of network magic preceding each record
    pub const MAGIC_LEN: usize = 4;

    /// Bytes of the little-endian record size following the magic
    pub const SIZE_LEN: usize = 4;

    /// Bytes of the double-SHA256 trailing each undo record
    pub const UNDO_HASH_LEN: usize = 32;

    /// Serialized block header length
    pub const HEADER_LEN: usize = 80;
}

/// File paths and names
pub mod files {
    /// Default directory for analysis output documents
    pub const DEFAULT_OUT_DIR: &str = "out";
}
