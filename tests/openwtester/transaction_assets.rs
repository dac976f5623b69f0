//! Transfer and summary flows: create → sign → verify → submit.

use ethers::signers::LocalWallet;
use std::collections::HashMap;
use tracing::{error, info};
use truechain_adapter::core::domain::{
    AssetsAccount, Coin, FeesSupportAccount, RawTransaction, RawTransactionWithError,
    SmartContract, SummaryRawTransaction,
};
use truechain_adapter::service::AssetsService;
use truechain_adapter::truechain::SYMBOL;
use truechain_adapter::WalletError;

use super::{key_account, test_init_wallet_manager, test_key};

async fn test_get_assets_account_balance(tm: &AssetsService, account: &AssetsAccount) {
    match tm.get_assets_account_balance(account).await {
        Ok(balance) => info!("balance: {:?}", balance),
        Err(e) => error!("GetAssetsAccountBalance failed, unexpected error: {}", e),
    }
}

async fn test_get_assets_account_token_balance(
    tm: &AssetsService,
    account: &AssetsAccount,
    contract: &SmartContract,
) {
    match tm.get_assets_account_token_balance(account, contract).await {
        Ok(balance) => info!("token balance: {:?}", balance.balance),
        Err(e) => error!("GetAssetsAccountTokenBalance failed, unexpected error: {}", e),
    }
}

async fn test_create_transaction_step(
    tm: &AssetsService,
    account: &AssetsAccount,
    to: &str,
    amount: &str,
    fee_rate: &str,
    contract: Option<&SmartContract>,
    ext_param: Option<HashMap<String, serde_json::Value>>,
) -> Result<RawTransaction, WalletError> {
    tm.create_transaction(account, amount, to, fee_rate, contract, ext_param)
        .await
        .inspect_err(|e| error!("CreateTransaction failed, unexpected error: {}", e))
}

#[allow(clippy::too_many_arguments)]
async fn test_create_summary_transaction_step(
    tm: &AssetsService,
    account: &AssetsAccount,
    coin: Coin,
    summary_address: &str,
    min_transfer: &str,
    retained_balance: &str,
    fee_rate: &str,
    start: usize,
    limit: i64,
    fees_support_account: Option<FeesSupportAccount>,
) -> Result<Vec<RawTransactionWithError>, WalletError> {
    let sum = SummaryRawTransaction {
        coin,
        account: account.clone(),
        fee_rate: fee_rate.to_string(),
        summary_address: summary_address.to_string(),
        min_transfer: min_transfer.to_string(),
        retained_balance: retained_balance.to_string(),
        address_start_index: start,
        address_limit: limit,
        fees_support_account,
    };
    tm.create_summary_raw_transaction_with_error(&sum)
        .await
        .inspect_err(|e| error!("CreateSummaryTransaction failed, unexpected error: {}", e))
}

async fn test_sign_transaction_step(
    tm: &AssetsService,
    raw_tx: &mut RawTransaction,
    key: &LocalWallet,
) -> Result<(), WalletError> {
    tm.sign_transaction(raw_tx, std::slice::from_ref(key))
        .await
        .inspect_err(|e| error!("SignTransaction failed, unexpected error: {}", e))?;
    info!("rawTx: {:?}", raw_tx);
    Ok(())
}

async fn test_verify_transaction_step(
    tm: &AssetsService,
    raw_tx: &mut RawTransaction,
) -> Result<(), WalletError> {
    tm.verify_transaction(raw_tx)
        .await
        .inspect_err(|e| error!("VerifyTransaction failed, unexpected error: {}", e))?;
    info!("rawTx: {:?}", raw_tx);
    Ok(())
}

async fn test_submit_transaction_step(
    tm: &AssetsService,
    raw_tx: &mut RawTransaction,
) -> Result<(), WalletError> {
    let tx = tm
        .submit_transaction(raw_tx)
        .await
        .inspect_err(|e| error!("SubmitTransaction failed, unexpected error: {}", e))?;
    info!("tx: {:?}", tx);
    info!("txID: {}", raw_tx.tx_id);
    Ok(())
}

fn token_contract() -> SmartContract {
    SmartContract {
        address: std::env::var("TRUE_TEST_TOKEN")
            .unwrap_or_else(|_| "0x1cC3150ABc543b62A20694DC16c9E614855A2C40".to_string()),
        symbol: SYMBOL.to_string(),
        decimals: 18,
        ..Default::default()
    }
}

/// Runs one built transaction through sign, verify and (optionally) submit.
async fn complete(
    tm: &AssetsService,
    raw_tx: &mut RawTransaction,
    key: &LocalWallet,
    submit: bool,
) -> Result<(), WalletError> {
    test_sign_transaction_step(tm, raw_tx, key).await?;
    test_verify_transaction_step(tm, raw_tx).await?;
    if submit {
        test_submit_transaction_step(tm, raw_tx).await?;
    }
    Ok(())
}

#[tokio::test]
#[ignore = "needs a live TRUE node and a funded key"]
async fn test_transfer_true() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let Some(key) = test_key() else { return };
    let account = key_account(
        "WCBkGX2YgKuZndqhZxEnuJMWm9w95UcMNx",
        "FEWHN8m8Mwey64KenQvVuZGYjErD1Sm7krsqirFe63uC",
        &key,
    );
    let addrs = ["0x09267e01f35c39f142ebc504bb4c4bcf617b5fef"];

    test_get_assets_account_balance(&tm, &account).await;

    for to in addrs {
        let Ok(mut raw_tx) =
            test_create_transaction_step(&tm, &account, to, "0.03", "", None, None).await
        else {
            return;
        };
        info!("rawTx: {:?}", raw_tx);
        if complete(&tm, &mut raw_tx, &key, true).await.is_err() {
            return;
        }
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node and a funded key"]
async fn test_transfer_trc20() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let Some(key) = test_key() else { return };
    let account = key_account(
        "WCBkGX2YgKuZndqhZxEnuJMWm9w95UcMNx",
        "FEWHN8m8Mwey64KenQvVuZGYjErD1Sm7krsqirFe63uC",
        &key,
    );
    let addrs = [
        "0x1fc3a35dc5d6e02687515a723f1eb8ab7fada85d",
        "0x227185a1068c0484c32a88174dba128c63cb8a0d",
        "0x72cb4302c995edca324578b9a074e4ebf16d2eec",
        "0x90c472898053e3b172e9fe7cee56adca3be6051a",
        "0x983a8de787c408266921e9724f3a5a3ff5e26c70",
        "0xb58cb5c64b9966cf84b4c8231ecf7d73ed4a225e",
    ];
    let contract = token_contract();

    test_get_assets_account_balance(&tm, &account).await;
    test_get_assets_account_token_balance(&tm, &account, &contract).await;

    for to in addrs {
        let Ok(mut raw_tx) =
            test_create_transaction_step(&tm, &account, to, "0.00001", "", Some(&contract), None)
                .await
        else {
            return;
        };
        if complete(&tm, &mut raw_tx, &key, true).await.is_err() {
            return;
        }
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node and a funded key"]
async fn test_summary_true() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let Some(key) = test_key() else { return };
    let account = key_account(
        "WBGYxZ6yEX582Mx8mGvygXevdLVc7NQnLM",
        "9EfTQiMEaKSMd1CjxMXRMMxukrwckxdBZpiEkS2B3avD",
        &key,
    );
    let summary_address = "0xd35f9ea14d063af9b3567064fab567275b09f03d";

    test_get_assets_account_balance(&tm, &account).await;

    let Ok(raw_tx_array) = test_create_summary_transaction_step(
        &tm,
        &account,
        Coin::native(SYMBOL),
        summary_address,
        "",
        "",
        "0.000000002",
        0,
        100,
        None,
    )
    .await
    else {
        return;
    };

    for raw_tx_with_err in raw_tx_array {
        if let Some(e) = raw_tx_with_err.error {
            error!("{}", e);
            continue;
        }
        let Some(mut raw_tx) = raw_tx_with_err.raw_tx else { continue };
        // built and verified only; nothing is broadcast
        if complete(&tm, &mut raw_tx, &key, false).await.is_err() {
            return;
        }
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node and a funded key"]
async fn test_summary_trc20() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let Some(key) = test_key() else { return };
    let account = key_account(
        "WBGYxZ6yEX582Mx8mGvygXevdLVc7NQnLM",
        "A1QQ8mLa2uGJhboZJjs1qkEt6zEGrWewfEfmnxs3tYhr",
        &key,
    );
    let summary_address = "0x301088aa99ce02fc51887920d14749316b0644c5";
    let fees_support = FeesSupportAccount {
        account: key_account(
            "WBGYxZ6yEX582Mx8mGvygXevdLVc7NQnLM",
            "HGwLhPQvU1at7BUiHBf1Kss1bDboX1TzKbA54CK5W3H",
            &key,
        ),
        fees_support_scale: "2".to_string(),
    };
    let contract = token_contract();

    test_get_assets_account_balance(&tm, &account).await;
    test_get_assets_account_token_balance(&tm, &account, &contract).await;

    let list = tm.get_address_list(&account, 0, -1);
    let address_limit = 2usize;

    for start in (0..list.len()).step_by(address_limit) {
        let Ok(raw_tx_array) = test_create_summary_transaction_step(
            &tm,
            &account,
            Coin::token(contract.clone()),
            summary_address,
            "",
            "",
            "",
            start,
            address_limit as i64,
            Some(fees_support.clone()),
        )
        .await
        else {
            return;
        };

        for raw_tx_with_err in raw_tx_array {
            if let Some(e) = raw_tx_with_err.error {
                error!("{}", e);
                continue;
            }
            let Some(mut raw_tx) = raw_tx_with_err.raw_tx else { continue };
            if complete(&tm, &mut raw_tx, &key, true).await.is_err() {
                return;
            }
        }
    }
}
