//! # Blocklens: Bitcoin Block and Transaction Analyzer
//!
//! Core library for structured analysis of consensus-serialized Bitcoin
//! data: raw transactions with their prevouts, and on-disk block files
//! paired with their undo (rev) files.
//!
//! ## Features
//!
//! - **Wire parsing**: legacy and SegWit transaction formats, block
//!   headers, CompactSize and undo-file CVarInt integers
//! - **Script analysis**: output/input classification, canonical ASM
//!   disassembly, OP_RETURN payload extraction
//! - **Undo decoding**: XOR de-obfuscation, compressed amounts, the six
//!   script-compression cases, best-effort record alignment
//! - **Block analysis**: Merkle verification, fee reconstruction and
//!   block-level statistics

pub mod address;
pub mod block_analyzer;
pub mod codec;
pub mod config;
pub mod error;
pub mod fixture;
pub mod script;
pub mod timelock;
pub mod tx_analyzer;
pub mod undo;
pub mod wire;

// Re-export commonly used types
pub use block_analyzer::{BlockAnalyzer, BlockRecord};
pub use error::{AnalyzerError, AnalyzerResult, ErrorRecord};
pub use fixture::{Fixture, NetworkTag, PrevoutRef};
pub use tx_analyzer::{TransactionAnalyzer, TransactionRecord};
