use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::errors::WalletError;

/// The asset a transaction or balance refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub symbol: String,
    pub is_contract: bool,
    pub contract_id: String,
    pub contract: Option<SmartContract>,
}

impl Coin {
    /// The native coin of `symbol`.
    pub fn native(symbol: &str) -> Self {
        Self { symbol: symbol.to_string(), ..Default::default() }
    }

    /// A token coin on the chain of `contract.symbol`.
    pub fn token(contract: SmartContract) -> Self {
        Self {
            symbol: contract.symbol.clone(),
            is_contract: true,
            contract_id: contract.contract_id.clone(),
            contract: Some(contract),
        }
    }
}

/// A token contract deployed on an asset's chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartContract {
    pub contract_id: String,
    /// Contract address (0x-prefixed hex)
    pub address: String,
    /// Symbol of the chain the contract lives on, e.g. "TRUE"
    pub symbol: String,
    pub name: String,
    /// Token ticker, e.g. "OCN"
    pub token: String,
    pub decimals: u8,
}

/// Balance of one address (or an aggregate over an account).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub symbol: String,
    pub address: String,
    pub balance: String,
    pub confirm_balance: String,
    pub unconfirm_balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub contract: SmartContract,
    pub balance: Balance,
}

/// An account owned by a wallet, with the addresses derived under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsAccount {
    pub wallet_id: String,
    pub account_id: String,
    pub alias: String,
    pub symbol: String,
    pub addresses: Vec<String>,
}

impl AssetsAccount {
    pub fn new(wallet_id: &str, account_id: &str, symbol: &str, addresses: Vec<String>) -> Self {
        Self {
            wallet_id: wallet_id.to_string(),
            account_id: account_id.to_string(),
            alias: String::new(),
            symbol: symbol.to_string(),
            addresses,
        }
    }

    /// Returns one page of addresses. A negative `limit` returns everything from `offset`.
    pub fn address_list(&self, offset: usize, limit: i64) -> Vec<String> {
        let rest = self.addresses.iter().skip(offset);
        if limit < 0 {
            rest.cloned().collect()
        } else {
            rest.take(limit as usize).cloned().collect()
        }
    }
}

/// A message an address owner must sign, and the signature once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub address: String,
    /// Hex digest to sign
    pub message: String,
    /// Hex signature, empty until signed
    pub signature: String,
}

/// A transaction moving through create → sign → verify → submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub coin: Coin,
    pub account: AssetsAccount,
    /// Recipient address → amount
    pub to: BTreeMap<String, String>,
    pub fee_rate: String,
    pub fees: String,
    pub chain_id: u64,
    /// Hex-encoded JSON of the unsigned transaction
    pub raw_hex: String,
    /// Hex-encoded signed RLP, set by verification
    pub signed_hex: String,
    pub signatures: Vec<KeySignature>,
    pub tx_from: Vec<String>,
    pub tx_to: Vec<String>,
    pub tx_amount: String,
    pub tx_id: String,
    pub is_built: bool,
    pub is_completed: bool,
    pub is_submit: bool,
    pub ext_param: HashMap<String, serde_json::Value>,
}

impl RawTransaction {
    /// Single recipient of the transaction.
    pub fn single_recipient(&self) -> Result<(&str, &str), WalletError> {
        let mut iter = self.to.iter();
        match (iter.next(), iter.next()) {
            (Some((addr, amount)), None) => Ok((addr.as_str(), amount.as_str())),
            (None, _) => Err(WalletError::TransactionFailed("no recipient given".into())),
            _ => Err(WalletError::Unsupported(
                "only one recipient per transaction is supported".into(),
            )),
        }
    }
}

/// Outcome of building one transaction of a batch.
#[derive(Debug)]
pub struct RawTransactionWithError {
    pub raw_tx: Option<RawTransaction>,
    pub error: Option<WalletError>,
}

impl RawTransactionWithError {
    pub fn ok(raw_tx: RawTransaction) -> Self {
        Self { raw_tx: Some(raw_tx), error: None }
    }

    pub fn err(error: WalletError) -> Self {
        Self { raw_tx: None, error: Some(error) }
    }
}

/// Account paying gas for token sweeps of addresses without native balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesSupportAccount {
    pub account: AssetsAccount,
    /// Multiple of the estimated fee sent to each address
    pub fees_support_scale: String,
}

/// Parameters of a summary (sweep) over one page of an account's addresses.
#[derive(Debug, Clone, Default)]
pub struct SummaryRawTransaction {
    pub coin: Coin,
    pub account: AssetsAccount,
    pub fee_rate: String,
    pub summary_address: String,
    pub min_transfer: String,
    pub retained_balance: String,
    pub address_start_index: usize,
    pub address_limit: i64,
    pub fees_support_account: Option<FeesSupportAccount>,
}

/// A transaction as seen on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    pub tx_id: String,
    pub block_height: Option<u64>,
    pub from: String,
    pub to: Option<String>,
    pub amount: String,
    pub nonce: u64,
}

/// Record produced after a successful submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: String,
    pub coin: Coin,
    pub account_id: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub amount: String,
    pub fees: String,
    pub submit_time: i64,
}
