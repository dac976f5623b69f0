//! Read-only queries through the host service.

use tracing::{error, info};
use truechain_adapter::core::domain::{AssetsAccount, Coin, SmartContract};
use truechain_adapter::truechain::SYMBOL;

use super::test_init_wallet_manager;

fn ocn_contract() -> SmartContract {
    SmartContract {
        contract_id: "0x1cC3150ABc543b62A20694DC16c9E614855A2C40".to_string(),
        address: "0x1cC3150ABc543b62A20694DC16c9E614855A2C40".to_string(),
        symbol: SYMBOL.to_string(),
        name: "OCoin".to_string(),
        token: "OCN".to_string(),
        decimals: 18,
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_assets_account_balance() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let account = AssetsAccount::new(
        "W2WoU9mK66LA2xVkK2XK6v8tFx5bjY3MLX",
        "3acWfDKFtfF6hC1HfQE8mq6VejRgjLZpDuo9eK1ViZBk",
        SYMBOL,
        vec!["0x82e88d3439a24a4603eb25b0b26328a906bc2e4f".to_string()],
    );

    match tm.get_assets_account_balance(&account).await {
        Ok(balance) => info!("balance: {:?}", balance),
        Err(e) => error!("GetAssetsAccountBalance failed, unexpected error: {}", e),
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_assets_account_token_balance() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let account = AssetsAccount::new(
        "WCBkGX2YgKuZndqhZxEnuJMWm9w95UcMNx",
        "CowQhDKmxb6Jaotkb4V3oqQSb2SCgcGy8819GpGVFLP8",
        SYMBOL,
        vec!["0x82e88d3439a24a4603eb25b0b26328a906bc2e4f".to_string()],
    );

    match tm.get_assets_account_token_balance(&account, &ocn_contract()).await {
        Ok(balance) => info!("balance: {:?}", balance.balance),
        Err(e) => error!("GetAssetsAccountTokenBalance failed, unexpected error: {}", e),
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_estimate_fee_rate() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let coin = Coin::native(SYMBOL);
    match tm.get_estimate_fee_rate(&coin).await {
        Ok((fee_rate, unit)) => info!("feeRate: {} {}/{}", fee_rate, coin.symbol, unit),
        Err(e) => error!("GetEstimateFeeRate failed, unexpected error: {}", e),
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_address_balance() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let addrs = vec![
        "0x1fc3a35dc5d6e02687515a723f1eb8ab7fada85d".to_string(),
        "0x227185a1068c0484c32a88174dba128c63cb8a0d".to_string(),
        "0x72cb4302c995edca324578b9a074e4ebf16d2eec".to_string(),
        "0x90c472898053e3b172e9fe7cee56adca3be6051a".to_string(),
        "0x983a8de787c408266921e9724f3a5a3ff5e26c70".to_string(),
        "0xb58cb5c64b9966cf84b4c8231ecf7d73ed4a225e".to_string(),
    ];

    let balances = match tm.get_balance_by_address(SYMBOL, &addrs).await {
        Ok(balances) => balances,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    for b in balances {
        info!("balance[{}] = {}", b.address, b.balance);
        info!("UnconfirmBalance[{}] = {}", b.address, b.unconfirm_balance);
        info!("ConfirmBalance[{}] = {}", b.address, b.confirm_balance);
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_address_token_balance() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let addrs = vec!["0x82e88d3439a24a4603eb25b0b26328a906bc2e4f".to_string()];

    let balances = match tm.get_token_balance_by_address(&ocn_contract(), &addrs).await {
        Ok(balances) => balances,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    for b in balances {
        info!("balance[{}] = {}", b.balance.address, b.balance.balance);
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_block_height() {
    let Some(tm) = test_init_wallet_manager() else { return };
    match tm.get_block_height(SYMBOL).await {
        Ok(height) => info!("block height: {}", height),
        Err(e) => error!("GetBlockHeight failed, unexpected error: {}", e),
    }
}

#[tokio::test]
#[ignore = "needs a live TRUE node"]
async fn test_get_transactions() {
    let Some(tm) = test_init_wallet_manager() else { return };
    let list = tm.get_transactions(0, -1);
    for (i, tx) in list.iter().enumerate() {
        info!("trx[{}] : {:?}", i, tx);
    }
    info!("trx count: {}", list.len());
}
