use async_trait::async_trait;
use ethers::signers::LocalWallet;

use crate::core::domain::{
    Balance, RawTransaction, RawTransactionWithError, SmartContract, SummaryRawTransaction,
    TokenBalance, Transaction, TxInfo,
};
use crate::core::{AssetsConfig, AssetsLogger, WalletError};

/// The capability set the host expects from every registered asset.
///
/// Chain work is split over four decoders, each reachable through a getter so
/// wrappers can forward them one by one.
pub trait AssetsAdapter: Send + Sync {
    /// Asset symbol, e.g. "TRUE".
    fn symbol(&self) -> String;

    /// Human-readable asset name.
    fn full_name(&self) -> String;

    /// Decimals of the native coin.
    fn decimals(&self) -> u8;

    /// Snapshot of the current configuration.
    fn config(&self) -> AssetsConfig;

    /// Replaces the configuration and reconnects to `config.server_api`.
    fn load_assets_config(&self, config: AssetsConfig) -> Result<(), WalletError>;

    fn logger(&self) -> &AssetsLogger;

    fn address_decoder(&self) -> &dyn AddressDecoder;

    fn transaction_decoder(&self) -> &dyn TransactionDecoder;

    fn block_scanner(&self) -> &dyn BlockScanner;

    fn smart_contract_decoder(&self) -> &dyn SmartContractDecoder;
}

/// Address validation and derivation.
pub trait AddressDecoder: Send + Sync {
    fn address_verify(&self, address: &str) -> bool;

    /// Derives an address from a SEC1 public key (compressed or not).
    fn public_key_to_address(&self, public_key: &[u8]) -> Result<String, WalletError>;
}

/// Read access to chain state.
#[async_trait]
pub trait BlockScanner: Send + Sync {
    async fn get_block_height(&self) -> Result<u64, WalletError>;

    /// Balances of `addresses`, in the order given.
    async fn get_balance_by_address(&self, addresses: &[String])
        -> Result<Vec<Balance>, WalletError>;

    /// Looks a transaction up by hash; `None` when the node does not know it.
    async fn get_transaction(&self, tx_id: &str) -> Result<Option<TxInfo>, WalletError>;
}

#[async_trait]
pub trait SmartContractDecoder: Send + Sync {
    async fn get_token_balance_by_address(
        &self,
        contract: &SmartContract,
        addresses: &[String],
    ) -> Result<Vec<TokenBalance>, WalletError>;
}

/// Building, signing, verifying and broadcasting transactions.
#[async_trait]
pub trait TransactionDecoder: Send + Sync {
    /// Builds an unsigned transaction and the signatures it still needs.
    async fn create_raw_transaction(&self, raw_tx: &mut RawTransaction) -> Result<(), WalletError>;

    /// Fills every pending signature for which a key is supplied.
    async fn sign_raw_transaction(
        &self,
        raw_tx: &mut RawTransaction,
        keys: &[LocalWallet],
    ) -> Result<(), WalletError>;

    /// Checks signatures and assembles the signed transaction.
    async fn verify_raw_transaction(&self, raw_tx: &mut RawTransaction) -> Result<(), WalletError>;

    async fn submit_raw_transaction(
        &self,
        raw_tx: &mut RawTransaction,
    ) -> Result<Transaction, WalletError>;

    /// Builds sweep transactions for one page of the account's addresses.
    async fn create_summary_raw_transaction(
        &self,
        sum_raw_tx: &SummaryRawTransaction,
    ) -> Result<Vec<RawTransactionWithError>, WalletError>;

    /// Current fee rate and its unit.
    async fn get_raw_transaction_fee_rate(&self) -> Result<(String, String), WalletError>;
}
