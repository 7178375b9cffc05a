//! Cluster selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Default mainnet-beta endpoint
pub const MAINNET_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default devnet endpoint
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Cluster a request is sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Network {
    #[default]
    #[serde(rename = "main")]
    Mainnet,
    #[serde(rename = "dev")]
    Devnet,
}

impl Network {
    /// Human-readable label used in tool responses
    pub fn label(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Devnet => "Devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Network {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            "dev" | "devnet" => Ok(Network::Devnet),
            other => Err(WalletError::SettingsError(format!("unknown network '{}'", other))),
        }
    }
}

/// Commitment level for queries and confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(WalletError::SettingsError(format!(
                "unknown commitment '{}'",
                other
            ))),
        }
    }
}
