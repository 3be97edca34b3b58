//! # Analysis Fixtures
//!
//! The caller-supplied input for transaction analysis: a network tag, the
//! raw transaction hex and the prevouts spent by its inputs. Block analysis
//! builds the same fixture internally from the blk/rev streams.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network the analyzed data belongs to (drives address encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkTag {
    Mainnet,
    Testnet,
}

impl NetworkTag {
    /// The matching rust-bitcoin network parameters
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            NetworkTag::Mainnet => bitcoin::Network::Bitcoin,
            NetworkTag::Testnet => bitcoin::Network::Testnet,
        }
    }
}

impl FromStr for NetworkTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(NetworkTag::Mainnet),
            "testnet" => Ok(NetworkTag::Testnet),
            _ => Err(format!("invalid network: {}", s)),
        }
    }
}

impl fmt::Display for NetworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkTag::Mainnet => write!(f, "mainnet"),
            NetworkTag::Testnet => write!(f, "testnet"),
        }
    }
}

/// Transaction-analysis input record.
///
/// Unrecognized JSON fields are ignored; `prevouts` may be omitted for a
/// coinbase transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub network: NetworkTag,
    pub raw_tx: String,
    #[serde(default)]
    pub prevouts: Vec<PrevoutRef>,
}

/// One previous output being spent, keyed by (txid, vout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrevoutRef {
    pub txid: String,
    pub vout: u32,
    pub value_sats: i64,
    pub script_pubkey_hex: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_tag_round_trip() {
        assert_eq!("mainnet".parse::<NetworkTag>().unwrap(), NetworkTag::Mainnet);
        assert_eq!("Testnet".parse::<NetworkTag>().unwrap(), NetworkTag::Testnet);
        assert!("signet".parse::<NetworkTag>().is_err());
        assert_eq!(NetworkTag::Mainnet.to_string(), "mainnet");
    }

    #[test]
    fn test_fixture_ignores_unknown_fields() {
        let json = r#"{
            "network": "mainnet",
            "raw_tx": "0100",
            "prevouts": [],
            "comment": "extra fields are fine"
        }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.network, NetworkTag::Mainnet);
        assert!(fixture.prevouts.is_empty());
    }

    #[test]
    fn test_fixture_prevouts_default_empty() {
        let json = r#"{"network": "testnet", "raw_tx": "0100"}"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert!(fixture.prevouts.is_empty());
    }

    #[test]
    fn test_fixture_rejects_unknown_network() {
        let json = r#"{"network": "regtest", "raw_tx": "0100"}"#;
        assert!(serde_json::from_str::<Fixture>(json).is_err());
    }
}
