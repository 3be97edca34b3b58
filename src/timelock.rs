//! # Timelock Analysis
//!
//! Absolute locktime classification, BIP68 relative timelocks carried in
//! input sequence numbers, and BIP125 replace-by-fee signaling.

use crate::config::consensus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpretation of a transaction's absolute locktime field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocktimeType {
    None,
    BlockHeight,
    UnixTimestamp,
}

impl fmt::Display for LocktimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocktimeType::None => write!(f, "none"),
            LocktimeType::BlockHeight => write!(f, "block_height"),
            LocktimeType::UnixTimestamp => write!(f, "unix_timestamp"),
        }
    }
}

/// Classify an absolute locktime value
pub fn locktime_type(locktime: u32) -> LocktimeType {
    if locktime == 0 {
        LocktimeType::None
    } else if locktime < consensus::LOCKTIME_THRESHOLD {
        LocktimeType::BlockHeight
    } else {
        LocktimeType::UnixTimestamp
    }
}

/// Unit of a BIP68 relative timelock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeTimelockKind {
    Blocks,
    Time,
}

/// BIP68 relative timelock decoded from an input sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelativeTimelock {
    pub enabled: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RelativeTimelockKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

impl RelativeTimelock {
    /// Decode a sequence number per BIP68.
    ///
    /// Bit 31 disables the lock, as do the two final sequence values used
    /// for absolute-locktime signaling. Bit 22 selects 512-second units
    /// over blocks; the low 16 bits carry the value.
    pub fn from_sequence(sequence: u32) -> Self {
        if sequence & consensus::SEQUENCE_DISABLE_FLAG != 0
            || sequence >= consensus::SEQUENCE_FINAL_THRESHOLD
        {
            return Self {
                enabled: false,
                kind: None,
                value: None,
            };
        }

        let raw = sequence & consensus::SEQUENCE_VALUE_MASK;
        if sequence & consensus::SEQUENCE_TIME_TYPE_FLAG != 0 {
            Self {
                enabled: true,
                kind: Some(RelativeTimelockKind::Time),
                value: Some(raw * consensus::SEQUENCE_TIME_GRANULARITY),
            }
        } else {
            Self {
                enabled: true,
                kind: Some(RelativeTimelockKind::Blocks),
                value: Some(raw),
            }
        }
    }
}

/// BIP125: any input sequence below 0xfffffffe opts the transaction in
pub fn is_rbf_signaling(sequences: &[u32]) -> bool {
    sequences
        .iter()
        .any(|&seq| seq < consensus::SEQUENCE_FINAL_THRESHOLD)
}
