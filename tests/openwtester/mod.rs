//! Shared setup for the live-node harness.

mod transaction_assets;
mod transaction_manager;

use ethers::signers::{LocalWallet, Signer};
use std::path::PathBuf;
use std::sync::Once;
use tracing::error;
use truechain_adapter::core::domain::AssetsAccount;
use truechain_adapter::service::{create_registry, AssetsService};

static INIT_LOGGING: Once = Once::new();

pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn config_dir() -> PathBuf {
    std::env::var("ASSETS_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("conf"))
}

/// Registry with the bundled adapters and their configs loaded.
pub fn test_init_wallet_manager() -> Option<AssetsService> {
    init_logging();
    let service = AssetsService::new(create_registry());
    match service.load_config_dir(config_dir()) {
        Ok(_) => Some(service),
        Err(e) => {
            error!("load config failed, unexpected error: {}", e);
            None
        }
    }
}

/// Signing key of the test account, from `TRUE_TEST_PRIVATE_KEY`.
pub fn test_key() -> Option<LocalWallet> {
    let raw = match std::env::var("TRUE_TEST_PRIVATE_KEY") {
        Ok(raw) => raw,
        Err(_) => {
            error!("TRUE_TEST_PRIVATE_KEY is not set");
            return None;
        }
    };
    match raw.trim().trim_start_matches("0x").parse::<LocalWallet>() {
        Ok(key) => Some(key),
        Err(e) => {
            error!("invalid TRUE_TEST_PRIVATE_KEY: {}", e);
            None
        }
    }
}

/// Account whose only address is the one controlled by `key`.
pub fn key_account(wallet_id: &str, account_id: &str, key: &LocalWallet) -> AssetsAccount {
    AssetsAccount::new(wallet_id, account_id, "TRUE", vec![format!("{:#x}", key.address())])
}
