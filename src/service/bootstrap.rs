//! Startup wiring: fills an [`AssetsRegistry`] with the adapters this build ships.

use std::sync::Arc;
use tracing::info;

use crate::openw::AssetsRegistry;
use crate::truechain::{self, TrueWalletManager};

/// Registers every bundled adapter into `registry`.
pub fn register_assets(registry: &AssetsRegistry) {
    registry.reg_assets(truechain::SYMBOL, Arc::new(TrueWalletManager::new()));
    info!("Wallet Manager Load Successfully.");
}

/// A fresh registry with every bundled adapter registered.
pub fn create_registry() -> Arc<AssetsRegistry> {
    let registry = AssetsRegistry::new();
    register_assets(&registry);
    Arc::new(registry)
}
