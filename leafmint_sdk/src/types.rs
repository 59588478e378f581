use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

pub use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Parse a base58 account address, ignoring surrounding whitespace
pub fn parse_address(raw: &str) -> Result<Pubkey> {
    let trimmed = raw.trim();
    Pubkey::from_str(trimmed).map_err(|_| Error::InvalidAddress(trimmed.to_string()))
}

/// Amount of lamports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    pub fn saturating_sub(self, other: Lamports) -> Lamports {
        Lamports(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / LAMPORTS_PER_SOL;
        let frac = self.0 % LAMPORTS_PER_SOL;
        if frac == 0 {
            return write!(f, "{whole} SOL");
        }
        let frac = format!("{frac:09}");
        write!(f, "{whole}.{} SOL", frac.trim_end_matches('0'))
    }
}

/// Confirmation level, ordered weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commitment::Processed => f.write_str("processed"),
            Commitment::Confirmed => f.write_str("confirmed"),
            Commitment::Finalized => f.write_str("finalized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::commitment_config::CommitmentLevel;

    #[test]
    fn test_parse_address() {
        let key = Pubkey::new_unique();
        assert_eq!(parse_address(&format!("  {key}\n")).unwrap(), key);
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert!(parse_address("").is_err());
        assert!(parse_address("not-base58-0OIl").is_err());
        // valid base58, wrong length
        assert!(matches!(parse_address("3yZe7d"), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_lamports_display() {
        assert_eq!(Lamports(0).to_string(), "0 SOL");
        assert_eq!(Lamports(LAMPORTS_PER_SOL * 2).to_string(), "2 SOL");
        assert_eq!(Lamports(1_500_000_000).to_string(), "1.5 SOL");
        assert_eq!(Lamports(5_000).to_string(), "0.000005 SOL");
    }

    #[test]
    fn test_commitment_order() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn test_commitment_config() {
        let config: CommitmentConfig = Commitment::Finalized.into();
        assert_eq!(config.commitment, CommitmentLevel::Finalized);
    }
}
