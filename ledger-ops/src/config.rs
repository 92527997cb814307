//! Configuration for the operation layer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Operation layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Statement store configuration
    pub store: ledger_store::Config,

    /// Exclusion scope configuration
    pub exclusion: ExclusionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "finledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            store: ledger_store::Config::default(),
            exclusion: ExclusionConfig::default(),
        }
    }
}

/// Exclusion scope configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Bounded wait for scope acquisition (milliseconds)
    pub lock_timeout_ms: u64,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
        }
    }
}

impl ExclusionConfig {
    /// Bounded wait as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ledger_store::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ledger_store::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> ledger_store::Result<Self> {
        let mut config = Config {
            store: ledger_store::Config::from_env()?,
            ..Default::default()
        };

        if let Ok(timeout) = std::env::var("FINLEDGER_LOCK_TIMEOUT_MS") {
            config.exclusion.lock_timeout_ms = timeout.parse().map_err(|e| {
                ledger_store::Error::Config(format!("Invalid FINLEDGER_LOCK_TIMEOUT_MS: {}", e))
            })?;
        }

        Ok(config)
    }
}
