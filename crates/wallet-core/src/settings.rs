//! Server settings
//!
//! Stores non-sensitive configuration (cluster endpoints and timeouts) in a
//! plain JSON file. A missing file means defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, WalletError};
use crate::network::{Commitment, Network, DEVNET_URL, MAINNET_URL};

const SETTINGS_FILE: &str = "settings.json";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Mainnet RPC endpoint
    pub mainnet_url: String,
    /// Devnet RPC endpoint
    pub devnet_url: String,
    /// Commitment used for queries and confirmation
    pub commitment: Commitment,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for a submitted transaction to confirm
    pub confirm_timeout_secs: u64,
    /// Delay between signature status polls
    pub confirm_poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mainnet_url: MAINNET_URL.to_string(),
            devnet_url: DEVNET_URL.to_string(),
            commitment: Commitment::Confirmed,
            request_timeout_secs: 30,
            confirm_timeout_secs: 60,
            confirm_poll_interval_ms: 500,
        }
    }
}

impl Settings {
    /// Default settings file location (`<config dir>/settings.json`)
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "walletmcp", "wallet-mcp")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                debug!("No config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| WalletError::SettingsError(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);

        settings.validate()?;
        Ok(settings)
    }

    /// Check endpoints and timeouts
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.mainnet_url)?;
        validate_endpoint(&self.devnet_url)?;

        if self.request_timeout_secs == 0 {
            return Err(WalletError::SettingsError(
                "requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(WalletError::SettingsError(
                "confirmTimeoutSecs must be greater than zero".to_string(),
            ));
        }
        if self.confirm_poll_interval_ms == 0 {
            return Err(WalletError::SettingsError(
                "confirmPollIntervalMs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Endpoint for a cluster
    pub fn endpoint(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Devnet => &self.devnet_url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms)
    }
}

/// Accept only absolute http(s) URLs
pub fn validate_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| WalletError::InvalidEndpoint(format!("'{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WalletError::InvalidEndpoint(format!(
            "'{}': unsupported scheme '{}'",
            endpoint, other
        ))),
    }
}
