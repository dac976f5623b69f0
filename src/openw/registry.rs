//! Asset registry: symbol → adapter.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::adapter::AssetsAdapter;
use crate::core::WalletError;

/// Maps asset symbols to their adapters.
///
/// Handed to whoever needs it; the application bootstrap fills it once at startup.
#[derive(Default)]
pub struct AssetsRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn AssetsAdapter>>>,
}

impl AssetsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under `symbol`. A second registration replaces the first.
    pub fn reg_assets(&self, symbol: &str, adapter: Arc<dyn AssetsAdapter>) {
        let previous = self.adapters.write().insert(symbol.to_string(), adapter);
        if previous.is_some() {
            warn!("Assets adapter for {} replaced", symbol);
        } else {
            debug!("Assets adapter for {} registered", symbol);
        }
    }

    /// Resolves the adapter registered under exactly `symbol`.
    pub fn get_assets_adapter(&self, symbol: &str) -> Result<Arc<dyn AssetsAdapter>, WalletError> {
        self.adapters
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| WalletError::NotFoundError(format!("{} is not support", symbol)))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.adapters.read().contains_key(symbol)
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.adapters.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.read().is_empty()
    }
}

impl std::fmt::Debug for AssetsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetsRegistry").field("symbols", &self.symbols()).finish()
    }
}
