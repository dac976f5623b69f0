//! EVM-compatible wallet manager.
//!
//! `QuorumWalletManager` implements the full [`AssetsAdapter`] capability set
//! for any chain that speaks the Ethereum JSON-RPC dialect. Asset-specific
//! adapters embed it and override only what differs (name, symbol, config).
//!
//! ```text
//! QuorumWalletManager<P>
//!   ├── AddressDecoder        address checks, pubkey → address
//!   ├── BlockScanner          block height, balances, tx lookup   (scanner.rs)
//!   ├── SmartContractDecoder  ERC-20 balanceOf                    (scanner.rs)
//!   └── TransactionDecoder    create/sign/verify/submit, fee rate (transaction.rs)
//!                             summary (sweep) batches             (summary.rs)
//! ```

pub mod abi;
mod scanner;
mod summary;
mod transaction;

use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockId, BlockNumber, TransactionRequest, U256};
use parking_lot::RwLock;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::config::NonceComputeMode;
use crate::core::units::parse_amount;
use crate::core::{AssetsConfig, AssetsLogger, WalletError};
use crate::openw::adapter::{
    AddressDecoder, AssetsAdapter, BlockScanner, SmartContractDecoder, TransactionDecoder,
};

pub const SYMBOL: &str = "QUORUM";

/// Gas of a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

type Connector<P> =
    Arc<dyn Fn(&AssetsConfig) -> Result<Provider<P>, WalletError> + Send + Sync>;

pub struct QuorumWalletManager<P: JsonRpcClient + Clone = Http> {
    config: RwLock<AssetsConfig>,
    log: AssetsLogger,
    provider: RwLock<Option<Provider<P>>>,
    connector: Connector<P>,
}

fn connect_http(config: &AssetsConfig) -> Result<Provider<Http>, WalletError> {
    let rpc_url = config.server_api.trim();
    let parsed_url = reqwest::Url::parse(rpc_url).map_err(|e| {
        WalletError::ConfigError(format!("Invalid {} RPC URL '{}': {}", config.symbol, rpc_url, e))
    })?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| WalletError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

    debug!("Using {} node at {}", config.symbol, parsed_url);
    Ok(Provider::new(Http::new_with_client(parsed_url, client)))
}

pub(crate) fn rpc_error(context: &str, err: impl Display) -> WalletError {
    WalletError::BlockchainError(format!("{}: {}", context, err))
}

pub(crate) fn parse_address(address: &str) -> Result<Address, WalletError> {
    Address::from_str(address.trim())
        .map_err(|e| WalletError::InvalidAddress(format!("'{}': {}", address, e)))
}

/// Lowercase 0x-prefixed form used in every record this crate produces.
pub(crate) fn address_to_string(address: &Address) -> String {
    format!("{:#x}", address)
}

impl QuorumWalletManager<Http> {
    /// Creates a manager with the default `QUORUM` configuration. The node is
    /// reached only after [`AssetsAdapter::load_assets_config`].
    pub fn new() -> Self {
        Self::with_connector(Arc::new(connect_http))
    }
}

impl Default for QuorumWalletManager<Http> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    fn with_connector(connector: Connector<P>) -> Self {
        Self {
            config: RwLock::new(AssetsConfig::new(SYMBOL)),
            log: AssetsLogger::new(SYMBOL),
            provider: RwLock::new(None),
            connector,
        }
    }

    /// Creates a manager bound to an existing provider. Loading a new
    /// configuration keeps using the same provider.
    pub fn with_provider(provider: Provider<P>) -> Self {
        let shared = provider.clone();
        let connector: Connector<P> =
            Arc::new(move |_: &AssetsConfig| -> Result<Provider<P>, WalletError> {
                Ok(shared.clone())
            });
        let mut wm = Self::with_connector(connector);
        wm.provider = RwLock::new(Some(provider));
        wm
    }

    /// Replaces the configuration without reconnecting.
    pub fn with_config(mut self, config: AssetsConfig) -> Self {
        self.config = RwLock::new(config);
        self
    }

    pub fn with_logger(mut self, log: AssetsLogger) -> Self {
        self.log = log;
        self
    }

    pub fn current_config(&self) -> AssetsConfig {
        self.config.read().clone()
    }

    pub(crate) fn provider(&self) -> Result<Provider<P>, WalletError> {
        self.provider.read().clone().ok_or_else(|| {
            WalletError::ConfigError(format!(
                "{} node is not configured, load the assets config first",
                self.log.symbol()
            ))
        })
    }

    pub(crate) async fn chain_id(
        &self,
        provider: &Provider<P>,
        config: &AssetsConfig,
    ) -> Result<u64, WalletError> {
        if config.chain_id != 0 {
            return Ok(config.chain_id);
        }
        let chain_id =
            provider.get_chainid().await.map_err(|e| rpc_error("Failed to get chain ID", e))?;
        Ok(chain_id.as_u64())
    }

    /// Gas price from `fee_rate` (coin units) when given, otherwise from the node.
    pub(crate) async fn gas_price(
        &self,
        provider: &Provider<P>,
        fee_rate: &str,
        decimals: u8,
    ) -> Result<U256, WalletError> {
        if !fee_rate.trim().is_empty() {
            return parse_amount(fee_rate, decimals);
        }
        let gas_price =
            provider.get_gas_price().await.map_err(|e| rpc_error("Failed to get gas price", e))?;
        debug!("get_gas_price got = 0x{:x}", gas_price);
        Ok(gas_price)
    }

    pub(crate) async fn gas_limit(
        &self,
        provider: &Provider<P>,
        config: &AssetsConfig,
        request: &TransactionRequest,
        is_token: bool,
    ) -> Result<U256, WalletError> {
        if let Some(fixed) = config.fix_gas_limit {
            return Ok(U256::from(fixed));
        }
        if !is_token {
            return Ok(U256::from(NATIVE_TRANSFER_GAS));
        }
        let tx: TypedTransaction = request.clone().into();
        provider.estimate_gas(&tx, None).await.map_err(|e| rpc_error("Failed to estimate gas", e))
    }

    pub(crate) async fn nonce_at(
        &self,
        provider: &Provider<P>,
        address: Address,
        mode: NonceComputeMode,
    ) -> Result<U256, WalletError> {
        let block = match mode {
            NonceComputeMode::Pending => BlockNumber::Pending,
            NonceComputeMode::Latest => BlockNumber::Latest,
        };
        let nonce = provider
            .get_transaction_count(address, Some(BlockId::Number(block)))
            .await
            .map_err(|e| rpc_error("Failed to get nonce", e))?;
        debug!("get_nonce got = 0x{:x}", nonce);
        Ok(nonce)
    }

    pub(crate) async fn native_balance(
        &self,
        provider: &Provider<P>,
        address: Address,
    ) -> Result<U256, WalletError> {
        provider.get_balance(address, None).await.map_err(|e| rpc_error("Failed to get balance", e))
    }

    pub(crate) async fn token_balance(
        &self,
        provider: &Provider<P>,
        token: Address,
        owner: Address,
    ) -> Result<U256, WalletError> {
        let request: TypedTransaction =
            TransactionRequest::new().to(token).data(abi::encode_balance_of(&owner)).into();
        let out = provider
            .call(&request, None)
            .await
            .map_err(|e| rpc_error("Failed to call balanceOf", e))?;
        abi::decode_uint256(&out)
    }
}

impl<P> AssetsAdapter for QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    fn symbol(&self) -> String {
        self.config.read().symbol.clone()
    }

    fn full_name(&self) -> String {
        "Quorum".to_string()
    }

    fn decimals(&self) -> u8 {
        self.config.read().decimals
    }

    fn config(&self) -> AssetsConfig {
        self.current_config()
    }

    fn load_assets_config(&self, config: AssetsConfig) -> Result<(), WalletError> {
        let provider = (self.connector)(&config)?;
        self.log.info(format!("assets config loaded, node {}", config.server_api));
        *self.provider.write() = Some(provider);
        *self.config.write() = config;
        Ok(())
    }

    fn logger(&self) -> &AssetsLogger {
        &self.log
    }

    fn address_decoder(&self) -> &dyn AddressDecoder {
        self
    }

    fn transaction_decoder(&self) -> &dyn TransactionDecoder {
        self
    }

    fn block_scanner(&self) -> &dyn BlockScanner {
        self
    }

    fn smart_contract_decoder(&self) -> &dyn SmartContractDecoder {
        self
    }
}

impl<P> AddressDecoder for QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    fn address_verify(&self, address: &str) -> bool {
        address.len() == 42 && address.starts_with("0x") && Address::from_str(address).is_ok()
    }

    fn public_key_to_address(&self, public_key: &[u8]) -> Result<String, WalletError> {
        let key = ethers::core::k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid public key: {}", e)))?;
        Ok(address_to_string(&ethers::utils::public_key_to_address(&key)))
    }
}
