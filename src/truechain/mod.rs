//! TRUE asset adapter.
//!
//! TRUE runs an EVM-compatible node, so all chain work is done by an embedded
//! [`QuorumWalletManager`]. This type only gives it the TRUE identity: symbol,
//! default configuration, logger and display name.

use ethers::providers::{Http, JsonRpcClient, Provider};

use crate::blockchain::quorum::QuorumWalletManager;
use crate::core::{AssetsConfig, AssetsLogger, WalletError};
use crate::openw::adapter::{
    AddressDecoder, AssetsAdapter, BlockScanner, SmartContractDecoder, TransactionDecoder,
};

pub const SYMBOL: &str = "TRUE";
pub const FULL_NAME: &str = "True";

pub struct TrueWalletManager<P: JsonRpcClient + Clone = Http> {
    inner: QuorumWalletManager<P>,
}

impl TrueWalletManager<Http> {
    pub fn new() -> Self {
        Self::wrap(QuorumWalletManager::new())
    }
}

impl Default for TrueWalletManager<Http> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> TrueWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    pub fn with_provider(provider: Provider<P>) -> Self {
        Self::wrap(QuorumWalletManager::with_provider(provider))
    }

    fn wrap(inner: QuorumWalletManager<P>) -> Self {
        let config = AssetsConfig::new(SYMBOL);
        let log = AssetsLogger::new(&config.symbol);
        Self { inner: inner.with_config(config).with_logger(log) }
    }

    /// The embedded EVM manager.
    pub fn inner(&self) -> &QuorumWalletManager<P> {
        &self.inner
    }
}

impl<P> AssetsAdapter for TrueWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    fn symbol(&self) -> String {
        self.inner.symbol()
    }

    fn full_name(&self) -> String {
        FULL_NAME.to_string()
    }

    fn decimals(&self) -> u8 {
        self.inner.decimals()
    }

    fn config(&self) -> AssetsConfig {
        self.inner.config()
    }

    fn load_assets_config(&self, config: AssetsConfig) -> Result<(), WalletError> {
        self.inner.load_assets_config(config)
    }

    fn logger(&self) -> &AssetsLogger {
        self.inner.logger()
    }

    fn address_decoder(&self) -> &dyn AddressDecoder {
        self.inner.address_decoder()
    }

    fn transaction_decoder(&self) -> &dyn TransactionDecoder {
        self.inner.transaction_decoder()
    }

    fn block_scanner(&self) -> &dyn BlockScanner {
        self.inner.block_scanner()
    }

    fn smart_contract_decoder(&self) -> &dyn SmartContractDecoder {
        self.inner.smart_contract_decoder()
    }
}
