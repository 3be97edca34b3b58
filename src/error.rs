//! # Error Types for the Analyzer
//!
//! This module provides error handling for parsing, classification and
//! block/undo decoding. Every variant maps to exactly one wire error code
//! so callers can render a stable `{code, message}` record.

use serde::Serialize;
use thiserror::Error;

/// Main error type for all analyzer operations
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Invalid command-line arguments
    #[error("invalid arguments: {message}")]
    InvalidArgs { message: String },

    /// An input file does not exist
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The JSON fixture is malformed or inconsistent
    #[error("invalid fixture: {message}")]
    InvalidFixture { message: String },

    /// A hex field failed to decode
    #[error("invalid hex: {message}")]
    InvalidHex { message: String },

    /// A decode ran past the end of its input
    #[error("truncated input while reading {context}")]
    Truncated { context: &'static str },

    /// A non-coinbase input has no matching prevout
    #[error("missing prevout for input {txid}:{vout}")]
    MissingPrevout { txid: String, vout: u32 },

    /// Two prevouts share the same (txid, vout) key
    #[error("duplicate prevout {txid}:{vout}")]
    DuplicatePrevout { txid: String, vout: u32 },

    /// The recomputed Merkle root does not match the block header
    #[error("computed merkle root does not match header (block {block_hash})")]
    InvalidMerkleRoot { block_hash: String },

    /// The undo payload could not be decoded for the matched block
    #[error("invalid undo data: {message}")]
    InvalidUndoData { message: String },

    /// The rev file holds no record aligned with the block
    #[error("no matching undo record found in rev file")]
    UndoNotFound,

    /// File I/O operations
    #[error("i/o error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Create an invalid-fixture error with a message
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::InvalidFixture {
            message: message.into(),
        }
    }

    /// Create an invalid-hex error with a message
    pub fn hex(message: impl Into<String>) -> Self {
        Self::InvalidHex {
            message: message.into(),
        }
    }

    /// Create a truncated-input error naming the field being read
    pub fn truncated(context: &'static str) -> Self {
        Self::Truncated { context }
    }

    /// Create an invalid-undo-data error with a message
    pub fn undo(message: impl Into<String>) -> Self {
        Self::InvalidUndoData {
            message: message.into(),
        }
    }

    /// The stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzerError::InvalidArgs { .. } => "INVALID_ARGS",
            AnalyzerError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AnalyzerError::InvalidFixture { .. } => "INVALID_FIXTURE",
            AnalyzerError::InvalidHex { .. } => "INVALID_HEX",
            AnalyzerError::Truncated { .. } => "TRUNCATED",
            AnalyzerError::MissingPrevout { .. } => "MISSING_PREVOUT",
            AnalyzerError::DuplicatePrevout { .. } => "DUPLICATE_PREVOUT",
            AnalyzerError::InvalidMerkleRoot { .. } => "INVALID_MERKLE_ROOT",
            AnalyzerError::InvalidUndoData { .. } => "INVALID_UNDO_DATA",
            AnalyzerError::UndoNotFound => "UNDO_NOT_FOUND",
            AnalyzerError::Io { .. } => "IO_ERROR",
        }
    }

    /// Check if this error is recoverable by fixing the caller's input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::InvalidArgs { .. }
                | AnalyzerError::FileNotFound { .. }
                | AnalyzerError::InvalidFixture { .. }
                | AnalyzerError::InvalidHex { .. }
        )
    }

    /// Render this error as a wire record
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// The `{code, message}` object carried by failing output records
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AnalyzerError::hex("odd length").code(), "INVALID_HEX");
        assert_eq!(AnalyzerError::truncated("vin count").code(), "TRUNCATED");
        assert_eq!(AnalyzerError::UndoNotFound.code(), "UNDO_NOT_FOUND");

        let missing = AnalyzerError::MissingPrevout {
            txid: "ab".repeat(32),
            vout: 1,
        };
        assert_eq!(missing.code(), "MISSING_PREVOUT");
        assert!(missing.to_string().contains(":1"));
    }

    #[test]
    fn test_error_classification() {
        assert!(AnalyzerError::fixture("bad prevout").is_input_error());
        assert!(!AnalyzerError::UndoNotFound.is_input_error());

        let io = AnalyzerError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(io.code(), "IO_ERROR");
    }

    #[test]
    fn test_error_record_shape() {
        let record = AnalyzerError::truncated("block header").to_record();
        assert_eq!(record.code, "TRUNCATED");
        assert!(record.message.contains("block header"));
    }
}
