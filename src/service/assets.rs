//! Host-side transaction service.
//!
//! Resolves the adapter of each request through the [`AssetsRegistry`] and
//! drives it: balances, fee rates and the create → sign → verify → submit cycle.

use ethers::signers::LocalWallet;
use ethers::types::U256;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::domain::{
    AssetsAccount, Balance, Coin, RawTransaction, RawTransactionWithError, SmartContract,
    SummaryRawTransaction, TokenBalance, Transaction, TxInfo,
};
use crate::core::units::{format_amount, parse_amount_or_zero};
use crate::core::{AssetsConfig, WalletError};
use crate::openw::{AssetsAdapter, AssetsRegistry};

#[derive(Debug, Clone)]
pub struct AssetsService {
    registry: Arc<AssetsRegistry>,
    /// Transactions submitted through this service, oldest first.
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl AssetsService {
    pub fn new(registry: Arc<AssetsRegistry>) -> Self {
        Self { registry, transactions: Arc::new(RwLock::new(Vec::new())) }
    }

    pub fn registry(&self) -> &Arc<AssetsRegistry> {
        &self.registry
    }

    pub fn adapter(&self, symbol: &str) -> Result<Arc<dyn AssetsAdapter>, WalletError> {
        self.registry.get_assets_adapter(symbol)
    }

    /// Loads `<dir>/<SYMBOL>.toml` for every registered asset, applies the
    /// environment overrides and returns the symbols that were configured.
    /// Assets without a file start from their defaults.
    pub fn load_config_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<String>, WalletError> {
        let dir = dir.as_ref();
        let mut loaded = Vec::new();
        for symbol in self.registry.symbols() {
            let path = AssetsConfig::file_path(&symbol, dir);
            let mut config = if path.exists() {
                AssetsConfig::load(&symbol, dir)?
            } else {
                warn!("No config for {} at {}, using defaults", symbol, path.display());
                AssetsConfig::new(&symbol)
            };
            config.apply_env_overrides()?;
            self.load_config(&symbol, config)?;
            loaded.push(symbol);
        }
        Ok(loaded)
    }

    pub fn load_config(&self, symbol: &str, config: AssetsConfig) -> Result<(), WalletError> {
        self.adapter(symbol)?.load_assets_config(config)
    }

    pub async fn get_block_height(&self, symbol: &str) -> Result<u64, WalletError> {
        self.adapter(symbol)?.block_scanner().get_block_height().await
    }

    pub async fn get_balance_by_address(
        &self,
        symbol: &str,
        addresses: &[String],
    ) -> Result<Vec<Balance>, WalletError> {
        self.adapter(symbol)?.block_scanner().get_balance_by_address(addresses).await
    }

    pub async fn get_token_balance_by_address(
        &self,
        contract: &SmartContract,
        addresses: &[String],
    ) -> Result<Vec<TokenBalance>, WalletError> {
        self.adapter(&contract.symbol)?
            .smart_contract_decoder()
            .get_token_balance_by_address(contract, addresses)
            .await
    }

    pub async fn get_transaction(
        &self,
        symbol: &str,
        tx_id: &str,
    ) -> Result<Option<TxInfo>, WalletError> {
        self.adapter(symbol)?.block_scanner().get_transaction(tx_id).await
    }

    pub fn get_address_list(
        &self,
        account: &AssetsAccount,
        offset: usize,
        limit: i64,
    ) -> Vec<String> {
        account.address_list(offset, limit)
    }

    /// Native balance summed over every address of `account`.
    pub async fn get_assets_account_balance(
        &self,
        account: &AssetsAccount,
    ) -> Result<Balance, WalletError> {
        let adapter = self.adapter(&account.symbol)?;
        let decimals = adapter.decimals();
        let balances =
            adapter.block_scanner().get_balance_by_address(&account.addresses).await?;
        let total = sum_balances(balances.iter(), decimals)?;
        Ok(Balance {
            symbol: account.symbol.clone(),
            address: account.account_id.clone(),
            balance: total.clone(),
            confirm_balance: total,
            unconfirm_balance: "0".to_string(),
        })
    }

    /// Token balance summed over every address of `account`.
    pub async fn get_assets_account_token_balance(
        &self,
        account: &AssetsAccount,
        contract: &SmartContract,
    ) -> Result<TokenBalance, WalletError> {
        let balances = self.get_token_balance_by_address(contract, &account.addresses).await?;
        let total = sum_balances(balances.iter().map(|b| &b.balance), contract.decimals)?;
        Ok(TokenBalance {
            contract: contract.clone(),
            balance: Balance {
                symbol: contract.symbol.clone(),
                address: account.account_id.clone(),
                balance: total.clone(),
                confirm_balance: total,
                unconfirm_balance: "0".to_string(),
            },
        })
    }

    pub async fn get_estimate_fee_rate(
        &self,
        coin: &Coin,
    ) -> Result<(String, String), WalletError> {
        self.adapter(&coin.symbol)?.transaction_decoder().get_raw_transaction_fee_rate().await
    }

    /// Builds an unsigned transfer of `amount` to `to` from one of the account's addresses.
    pub async fn create_transaction(
        &self,
        account: &AssetsAccount,
        amount: &str,
        to: &str,
        fee_rate: &str,
        contract: Option<&SmartContract>,
        ext_param: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<RawTransaction, WalletError> {
        let coin = match contract {
            Some(contract) => Coin::token(contract.clone()),
            None => Coin::native(&account.symbol),
        };
        let adapter = self.adapter(&coin.symbol)?;

        let mut raw_tx = RawTransaction {
            coin,
            account: account.clone(),
            to: BTreeMap::from([(to.to_string(), amount.to_string())]),
            fee_rate: fee_rate.to_string(),
            ext_param: ext_param.unwrap_or_default(),
            ..Default::default()
        };
        adapter.transaction_decoder().create_raw_transaction(&mut raw_tx).await?;
        debug!("created raw transaction for account {}", account.account_id);
        Ok(raw_tx)
    }

    pub async fn sign_transaction(
        &self,
        raw_tx: &mut RawTransaction,
        keys: &[LocalWallet],
    ) -> Result<(), WalletError> {
        let adapter = self.adapter(&raw_tx.coin.symbol)?;
        adapter.transaction_decoder().sign_raw_transaction(raw_tx, keys).await
    }

    pub async fn verify_transaction(&self, raw_tx: &mut RawTransaction) -> Result<(), WalletError> {
        let adapter = self.adapter(&raw_tx.coin.symbol)?;
        adapter.transaction_decoder().verify_raw_transaction(raw_tx).await
    }

    pub async fn submit_transaction(
        &self,
        raw_tx: &mut RawTransaction,
    ) -> Result<Transaction, WalletError> {
        let adapter = self.adapter(&raw_tx.coin.symbol)?;
        let tx = adapter.transaction_decoder().submit_raw_transaction(raw_tx).await?;
        info!(tx_id = %tx.tx_id, "{} transaction submitted", raw_tx.coin.symbol);
        self.transactions.write().push(tx.clone());
        Ok(tx)
    }

    /// One page of the submitted transactions. A negative `limit` returns
    /// everything from `offset`.
    pub fn get_transactions(&self, offset: usize, limit: i64) -> Vec<Transaction> {
        let transactions = self.transactions.read();
        let rest = transactions.iter().skip(offset);
        if limit < 0 {
            rest.cloned().collect()
        } else {
            rest.take(limit as usize).cloned().collect()
        }
    }

    /// Signs, verifies and submits a built transaction.
    pub async fn send_transaction(
        &self,
        raw_tx: &mut RawTransaction,
        keys: &[LocalWallet],
    ) -> Result<Transaction, WalletError> {
        self.sign_transaction(raw_tx, keys).await?;
        self.verify_transaction(raw_tx).await?;
        self.submit_transaction(raw_tx).await
    }

    pub async fn create_summary_raw_transaction_with_error(
        &self,
        sum_raw_tx: &SummaryRawTransaction,
    ) -> Result<Vec<RawTransactionWithError>, WalletError> {
        let adapter = self.adapter(&sum_raw_tx.coin.symbol)?;
        adapter.transaction_decoder().create_summary_raw_transaction(sum_raw_tx).await
    }
}

fn sum_balances<'a>(
    balances: impl Iterator<Item = &'a Balance>,
    decimals: u8,
) -> Result<String, WalletError> {
    let mut total = U256::zero();
    for balance in balances {
        let value = parse_amount_or_zero(&balance.balance, decimals)?;
        total = total
            .checked_add(value)
            .ok_or_else(|| WalletError::InvalidAmount("balance sum out of range".into()))?;
    }
    format_amount(total, decimals)
}
