use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::WalletError;

/// Where the nonce of a new transaction comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceComputeMode {
    /// `eth_getTransactionCount(addr, "pending")`, counts transactions still in the pool.
    #[default]
    Pending,
    /// `eth_getTransactionCount(addr, "latest")`, mined transactions only.
    Latest,
}

/// Per-asset configuration.
///
/// One instance is scoped to one asset symbol; the file form is
/// `<config dir>/<SYMBOL>.toml` and any key left out takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Asset symbol this configuration belongs to. Always forced to the caller's symbol.
    #[serde(default)]
    pub symbol: String,

    /// JSON-RPC endpoint of the node
    #[serde(default = "AssetsConfig::default_server_api")]
    pub server_api: String,

    /// EIP-155 chain id; 0 means "ask the node"
    #[serde(default)]
    pub chain_id: u64,

    /// Decimals of the native coin
    #[serde(default = "AssetsConfig::default_decimals")]
    pub decimals: u8,

    /// Fixed gas limit for every transaction, bypassing estimation
    #[serde(default)]
    pub fix_gas_limit: Option<u64>,

    #[serde(default)]
    pub nonce_compute_mode: NonceComputeMode,

    /// HTTP request timeout (seconds)
    #[serde(default = "AssetsConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AssetsConfig {
    fn default_server_api() -> String {
        "http://127.0.0.1:8545".to_string()
    }
    fn default_decimals() -> u8 {
        18
    }
    fn default_request_timeout_secs() -> u64 {
        10
    }

    /// Creates the default configuration scoped to `symbol`.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            server_api: Self::default_server_api(),
            chain_id: 0,
            decimals: Self::default_decimals(),
            fix_gas_limit: None,
            nonce_compute_mode: NonceComputeMode::default(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }

    /// Parses a TOML document into a configuration scoped to `symbol`.
    pub fn from_toml_str(symbol: &str, text: &str) -> Result<Self, WalletError> {
        let mut config: AssetsConfig = toml::from_str(text)?;
        config.symbol = symbol.to_string();
        if config.server_api.trim().is_empty() {
            return Err(WalletError::ConfigError(format!("{} server_api is empty", symbol)));
        }
        Ok(config)
    }

    /// Loads `<dir>/<SYMBOL>.toml`.
    pub fn load(symbol: &str, dir: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = Self::file_path(symbol, dir);
        debug!("Loading assets config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|e| {
            WalletError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(symbol, &text)?;
        info!("Loaded {} config (RPC: {})", symbol, config.server_api);
        Ok(config)
    }

    /// Location of the configuration file for `symbol` inside `dir`.
    pub fn file_path(symbol: &str, dir: impl AsRef<Path>) -> std::path::PathBuf {
        dir.as_ref().join(format!("{}.toml", symbol))
    }

    /// Applies `<SYMBOL>_SERVER_API` and `<SYMBOL>_CHAIN_ID` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), WalletError> {
        let prefix = self.symbol.to_uppercase();
        if let Ok(url) = std::env::var(format!("{}_SERVER_API", prefix)) {
            if !url.trim().is_empty() {
                self.server_api = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var(format!("{}_CHAIN_ID", prefix)) {
            self.chain_id = raw.trim().parse().map_err(|e| {
                WalletError::ConfigError(format!("{}_CHAIN_ID is not a number: {}", prefix, e))
            })?;
        }
        Ok(())
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self::new("")
    }
}
