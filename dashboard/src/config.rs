//! Dashboard configuration
//!
//! The dashboard only needs to know:
//! - Which wallet endpoint to talk to
//! - Where the pool and its tokens are deployed
//! - How long to wait for transactions and how often to refresh

use alloy_primitives::{address, Address};
use polylend_core::{AssetDeployment, AssetId, Deployment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `rpc_url`.
pub const RPC_URL_ENV: &str = "POLYLEND_RPC_URL";

pub const DEFAULT_POOL: Address = address!("f386c02dAe719a36BEFbC6bB02dd2f3C8D7B93b6");
pub const DEFAULT_USDC: Address = address!("22Fe4496E1ED9e4f03D3991c6040501f24add7Fd");
pub const DEFAULT_DAI: Address = address!("dc06d38A7560e76D2766cD85C0192260f778BA0A");
pub const DEFAULT_WETH: Address = address!("fC7D7c7424Db3F94E7E28b905dCE2DCaeb0cFb90");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet provider (e.g. a local signer).
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Pool and token addresses.
    #[serde(default = "default_deployment")]
    pub deployment: Deployment,

    /// Upper bound on each confirmation wait. `0` waits indefinitely.
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval.
    #[serde(default = "default_receipt_poll")]
    pub receipt_poll_ms: u64,

    /// Background refresh of account and market data.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Fractional digits shown for token amounts.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:1248".to_string()
}

fn default_confirmation_timeout() -> u64 {
    120
}

fn default_receipt_poll() -> u64 {
    1000
}

fn default_refresh_interval() -> u64 {
    15
}

fn default_decimal_places() -> usize {
    2
}

/// The public PolyLend deployment.
pub fn default_deployment() -> Deployment {
    Deployment {
        pool: DEFAULT_POOL,
        chain_id: None,
        rate_decimals: 18,
        assets: vec![
            AssetDeployment {
                asset: AssetId::Usdc,
                token: DEFAULT_USDC,
                decimals: Some(AssetId::Usdc.conventional_decimals()),
            },
            AssetDeployment {
                asset: AssetId::Dai,
                token: DEFAULT_DAI,
                decimals: Some(AssetId::Dai.conventional_decimals()),
            },
            AssetDeployment {
                asset: AssetId::Weth,
                token: DEFAULT_WETH,
                decimals: Some(AssetId::Weth.conventional_decimals()),
            },
        ],
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            deployment: default_deployment(),
            confirmation_timeout_secs: default_confirmation_timeout(),
            receipt_poll_ms: default_receipt_poll(),
            refresh_interval_secs: default_refresh_interval(),
            decimal_places: default_decimal_places(),
        }
    }
}

impl Config {
    /// Load configuration from disk, creating the default file on first run.
    /// `POLYLEND_RPC_URL` overrides the stored endpoint.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                log::info!("🔧 {} overrides rpc_url: {}", RPC_URL_ENV, url);
                config.rpc_url = url;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            log::info!("📁 Loading config from: {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            log::info!(
                "✅ Config loaded: rpc={}, {} assets",
                config.rpc_url,
                config.deployment.assets.len()
            );
            Ok(config)
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        log::info!("💾 Config saved to: {}", path.display());
        Ok(())
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Get base data directory
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(".polylend");
        Ok(path)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        match self.confirmation_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms.max(100))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidEndpoint(self.rpc_url.clone()));
        }

        let mut seen = Vec::new();
        for asset in &self.deployment.assets {
            if seen.contains(&asset.asset) {
                return Err(ConfigError::DuplicateAsset(asset.asset));
            }
            seen.push(asset.asset);
        }

        Ok(())
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Invalid endpoint: {0} (must start with http:// or https://)")]
    InvalidEndpoint(String),

    #[error("Asset {0} is listed more than once")]
    DuplicateAsset(AssetId),
}
