use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, Middleware};
use ethers::types::H256;
use std::str::FromStr;
use tracing::debug;

use super::{address_to_string, parse_address, rpc_error, QuorumWalletManager};
use crate::core::domain::{Balance, SmartContract, TokenBalance, TxInfo};
use crate::core::units::format_amount;
use crate::core::WalletError;
use crate::openw::adapter::{AssetsAdapter, BlockScanner, SmartContractDecoder};

#[async_trait]
impl<P> BlockScanner for QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    async fn get_block_height(&self) -> Result<u64, WalletError> {
        let provider = self.provider()?;
        let height = provider
            .get_block_number()
            .await
            .map_err(|e| rpc_error("Failed to get block number", e))?;
        Ok(height.as_u64())
    }

    async fn get_balance_by_address(
        &self,
        addresses: &[String],
    ) -> Result<Vec<Balance>, WalletError> {
        let provider = self.provider()?;
        let config = self.current_config();

        let mut balances = Vec::with_capacity(addresses.len());
        for address in addresses {
            let owner = parse_address(address)?;
            let value = self.native_balance(&provider, owner).await?;
            let amount = format_amount(value, config.decimals)?;
            debug!("Balance of {}: {} {}", address, amount, config.symbol);
            balances.push(Balance {
                symbol: config.symbol.clone(),
                address: address.clone(),
                balance: amount.clone(),
                confirm_balance: amount,
                unconfirm_balance: "0".to_string(),
            });
        }
        Ok(balances)
    }

    async fn get_transaction(&self, tx_id: &str) -> Result<Option<TxInfo>, WalletError> {
        let hash = H256::from_str(tx_id.trim()).map_err(|e| {
            WalletError::InvalidInput(format!("Invalid transaction hash '{}': {}", tx_id, e))
        })?;
        let provider = self.provider()?;
        let decimals = self.decimals();

        let tx = provider
            .get_transaction(hash)
            .await
            .map_err(|e| rpc_error("Failed to get transaction", e))?;

        let Some(tx) = tx else {
            return Ok(None);
        };
        Ok(Some(TxInfo {
            tx_id: format!("{:#x}", tx.hash),
            block_height: tx.block_number.map(|n| n.as_u64()),
            from: address_to_string(&tx.from),
            to: tx.to.as_ref().map(address_to_string),
            amount: format_amount(tx.value, decimals)?,
            nonce: tx.nonce.as_u64(),
        }))
    }
}

#[async_trait]
impl<P> SmartContractDecoder for QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    async fn get_token_balance_by_address(
        &self,
        contract: &SmartContract,
        addresses: &[String],
    ) -> Result<Vec<TokenBalance>, WalletError> {
        let provider = self.provider()?;
        let token = parse_address(&contract.address)?;

        let mut balances = Vec::with_capacity(addresses.len());
        for address in addresses {
            let owner = parse_address(address)?;
            let value = self.token_balance(&provider, token, owner).await?;
            let amount = format_amount(value, contract.decimals)?;
            debug!("Token {} balance of {}: {}", contract.token, address, amount);
            balances.push(TokenBalance {
                contract: contract.clone(),
                balance: Balance {
                    symbol: contract.symbol.clone(),
                    address: address.clone(),
                    balance: amount.clone(),
                    confirm_balance: amount,
                    unconfirm_balance: "0".to_string(),
                },
            });
        }
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetsConfig;
    use ethers::providers::{MockProvider, Provider};
    use ethers::types::{Transaction, U256, U64};

    const OWNER: &str = "0x82e88d3439a24a4603eb25b0b26328a906bc2e4f";

    fn manager() -> (QuorumWalletManager<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (QuorumWalletManager::with_provider(provider), mock)
    }

    #[tokio::test]
    async fn block_height_from_node() {
        let (wm, mock) = manager();
        mock.push(U64::from(1_234_567u64)).unwrap();
        assert_eq!(wm.get_block_height().await.unwrap(), 1_234_567);
    }

    #[tokio::test]
    async fn balances_keep_input_order() {
        let (wm, mock) = manager();
        let other = "0x2222222222222222222222222222222222222222".to_string();
        // responses are served last-pushed first
        mock.push(U256::from(5u64) * U256::exp10(17)).unwrap();
        mock.push(U256::from(3u64) * U256::exp10(18)).unwrap();

        let balances = wm.get_balance_by_address(&[OWNER.to_string(), other.clone()]).await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].address, OWNER);
        assert_eq!(balances[0].balance, "3");
        assert_eq!(balances[0].symbol, "QUORUM");
        assert_eq!(balances[1].address, other);
        assert_eq!(balances[1].confirm_balance, "0.5");
        assert_eq!(balances[1].unconfirm_balance, "0");
    }

    #[tokio::test]
    async fn balance_rejects_bad_address() {
        let (wm, _mock) = manager();
        let err = wm.get_balance_by_address(&["0xnope".to_string()]).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn token_balance_decodes_call_result() {
        let (wm, mock) = manager();
        let mut word = [0u8; 32];
        U256::from(1_500_000u64).to_big_endian(&mut word);
        mock.push::<ethers::types::Bytes, _>(ethers::types::Bytes::from(word.to_vec())).unwrap();

        let contract = SmartContract {
            address: "0x1cC3150ABc543b62A20694DC16c9E614855A2C40".into(),
            symbol: "QUORUM".into(),
            token: "OCN".into(),
            decimals: 6,
            ..Default::default()
        };
        let balances =
            wm.get_token_balance_by_address(&contract, &[OWNER.to_string()]).await.unwrap();
        assert_eq!(balances[0].balance.balance, "1.5");
        assert_eq!(balances[0].contract.token, "OCN");
    }

    #[tokio::test]
    async fn unknown_transaction_is_none() {
        let (wm, mock) = manager();
        mock.push(Option::<Transaction>::None).unwrap();
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(wm.get_transaction(&hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transaction_fields_are_mapped() {
        let (wm, mock) = manager();
        let from = parse_address(OWNER).unwrap();
        let tx = Transaction {
            hash: H256::repeat_byte(0xab),
            nonce: U256::from(7u64),
            block_number: Some(U64::from(99u64)),
            from,
            to: Some(from),
            value: U256::exp10(18),
            ..Default::default()
        };
        mock.push(Some(tx)).unwrap();

        let info = wm.get_transaction(&format!("0x{}", "ab".repeat(32))).await.unwrap().unwrap();
        assert_eq!(info.block_height, Some(99));
        assert_eq!(info.nonce, 7);
        assert_eq!(info.amount, "1");
        assert_eq!(info.from, OWNER);
    }

    #[tokio::test]
    async fn bad_hash_fails_before_rpc() {
        let (wm, _mock) = manager();
        let err = wm.get_transaction("0x1234").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn disconnected_manager_reports_config_error() {
        let wm = QuorumWalletManager::new().with_config(AssetsConfig::new("QUORUM"));
        let err = wm.get_block_height().await.unwrap_err();
        assert!(matches!(err, WalletError::ConfigError(_)));
    }
}
