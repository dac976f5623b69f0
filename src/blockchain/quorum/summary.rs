//! Summary (sweep) transactions: move what each address holds to one
//! collection address, keeping `retained_balance` behind.

use ethers::providers::{JsonRpcClient, Provider};
use ethers::types::{Address, TransactionRequest, U256};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::transaction::{seal_raw_transaction, transfer_request};
use super::{address_to_string, parse_address, QuorumWalletManager};
use crate::core::config::AssetsConfig;
use crate::core::domain::{
    AssetsAccount, Coin, FeesSupportAccount, RawTransaction, RawTransactionWithError,
    SummaryRawTransaction,
};
use crate::core::units::{format_amount, parse_amount, parse_amount_or_zero};
use crate::core::WalletError;
use crate::openw::adapter::AssetsAdapter;

/// Decimals used to read `fees_support_scale`.
const SCALE_DECIMALS: u8 = 4;

struct SweepContext<P: JsonRpcClient + Clone> {
    provider: Provider<P>,
    config: AssetsConfig,
    gas_price: U256,
    chain_id: u64,
    summary_to: Address,
    min_transfer: U256,
    retained: U256,
    /// Fee payers already used in this batch.
    payers: HashMap<Address, PayerState>,
}

/// Native funds and next nonce of a fee payer after the transfers built so far.
#[derive(Clone, Copy)]
struct PayerState {
    balance: U256,
    nonce: U256,
}

impl<P> QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    pub(crate) async fn build_summary_transactions(
        &self,
        sum_raw_tx: &SummaryRawTransaction,
    ) -> Result<Vec<RawTransactionWithError>, WalletError> {
        let provider = self.provider()?;
        let config = self.current_config();

        let token = match (sum_raw_tx.coin.is_contract, sum_raw_tx.coin.contract.as_ref()) {
            (false, _) => None,
            (true, Some(contract)) => Some((parse_address(&contract.address)?, contract.decimals)),
            (true, None) => {
                return Err(WalletError::InvalidInput("token summary without contract".into()))
            }
        };
        let decimals = token.map(|(_, d)| d).unwrap_or(config.decimals);

        let addresses = sum_raw_tx
            .account
            .address_list(sum_raw_tx.address_start_index, sum_raw_tx.address_limit);
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let gas_price = self.gas_price(&provider, &sum_raw_tx.fee_rate, config.decimals).await?;
        let chain_id = self.chain_id(&provider, &config).await?;
        let mut ctx = SweepContext {
            provider,
            gas_price,
            chain_id,
            summary_to: parse_address(&sum_raw_tx.summary_address)?,
            min_transfer: parse_amount_or_zero(&sum_raw_tx.min_transfer, decimals)?,
            retained: parse_amount_or_zero(&sum_raw_tx.retained_balance, decimals)?,
            config,
            payers: HashMap::new(),
        };

        let mut results = Vec::new();
        for address in &addresses {
            let outcome = match token {
                None => self.sweep_native(&mut ctx, sum_raw_tx, address).await,
                Some((token_address, token_decimals)) => {
                    self.sweep_token(&mut ctx, sum_raw_tx, address, token_address, token_decimals)
                        .await
                }
            };
            match outcome {
                Ok(mut built) => results.append(&mut built),
                Err(e) => {
                    self.logger().warn(format!("summary of {} failed: {}", address, e));
                    results.push(RawTransactionWithError::err(e));
                }
            }
        }
        self.logger().info(format!(
            "summary built {} transactions from {} addresses",
            results.iter().filter(|r| r.raw_tx.is_some()).count(),
            addresses.len()
        ));
        Ok(results)
    }

    async fn sweep_native(
        &self,
        ctx: &mut SweepContext<P>,
        sum_raw_tx: &SummaryRawTransaction,
        address: &str,
    ) -> Result<Vec<RawTransactionWithError>, WalletError> {
        let from = parse_address(address)?;
        let balance = self.native_balance(&ctx.provider, from).await?;
        if balance < ctx.min_transfer || balance <= ctx.retained {
            debug!("{} balance {} below summary threshold", address, balance);
            return Ok(Vec::new());
        }

        let template = transfer_request(from, ctx.summary_to, U256::zero(), None);
        let gas_limit = self.gas_limit(&ctx.provider, &ctx.config, &template, false).await?;
        let fee = gas_limit.saturating_mul(ctx.gas_price);
        let available = balance - ctx.retained;
        if available <= fee {
            return Err(WalletError::InsufficientFunds(format!(
                "{} holds {} which does not cover the fee {}",
                address,
                format_amount(available, ctx.config.decimals)?,
                format_amount(fee, ctx.config.decimals)?
            )));
        }

        let amount = available - fee;
        let nonce = self.nonce_at(&ctx.provider, from, ctx.config.nonce_compute_mode).await?;
        let request = transfer_request(from, ctx.summary_to, amount, None)
            .gas(gas_limit)
            .gas_price(ctx.gas_price)
            .nonce(nonce);

        let raw_tx = self.summary_raw_transaction(
            ctx,
            sum_raw_tx.coin.clone(),
            sum_raw_tx.account.clone(),
            request,
            &address_to_string(&ctx.summary_to),
            &format_amount(amount, ctx.config.decimals)?,
        )?;
        Ok(vec![RawTransactionWithError::ok(raw_tx)])
    }

    async fn sweep_token(
        &self,
        ctx: &mut SweepContext<P>,
        sum_raw_tx: &SummaryRawTransaction,
        address: &str,
        token: Address,
        token_decimals: u8,
    ) -> Result<Vec<RawTransactionWithError>, WalletError> {
        let from = parse_address(address)?;
        let balance = self.token_balance(&ctx.provider, token, from).await?;
        if balance.is_zero() || balance < ctx.min_transfer || balance <= ctx.retained {
            debug!("{} token balance {} below summary threshold", address, balance);
            return Ok(Vec::new());
        }

        let amount = balance - ctx.retained;
        let request = transfer_request(from, ctx.summary_to, amount, Some(token));
        let gas_limit = self.gas_limit(&ctx.provider, &ctx.config, &request, true).await?;
        let fee = gas_limit.saturating_mul(ctx.gas_price);

        let native = self.native_balance(&ctx.provider, from).await?;
        if native < fee {
            let Some(support) = sum_raw_tx.fees_support_account.as_ref() else {
                return Err(WalletError::InsufficientFunds(format!(
                    "{} needs {} {} for fees and no fees support account is set",
                    address,
                    format_amount(fee, ctx.config.decimals)?,
                    ctx.config.symbol
                )));
            };
            let fee_tx = self.fees_support_transaction(ctx, support, from, fee).await?;
            self.logger().info(format!(
                "{} lacks fees, sending {} {} first",
                address, fee_tx.tx_amount, ctx.config.symbol
            ));
            return Ok(vec![RawTransactionWithError::ok(fee_tx)]);
        }

        let nonce = self.nonce_at(&ctx.provider, from, ctx.config.nonce_compute_mode).await?;
        let request = request.gas(gas_limit).gas_price(ctx.gas_price).nonce(nonce);
        let raw_tx = self.summary_raw_transaction(
            ctx,
            sum_raw_tx.coin.clone(),
            sum_raw_tx.account.clone(),
            request,
            &address_to_string(&ctx.summary_to),
            &format_amount(amount, token_decimals)?,
        )?;
        Ok(vec![RawTransactionWithError::ok(raw_tx)])
    }

    /// Native transfer from the support account to `to` covering `fee` times the scale.
    async fn fees_support_transaction(
        &self,
        ctx: &mut SweepContext<P>,
        support: &FeesSupportAccount,
        to: Address,
        fee: U256,
    ) -> Result<RawTransaction, WalletError> {
        let payer_text = support.account.addresses.first().ok_or_else(|| {
            WalletError::InvalidInput("fees support account has no address".into())
        })?;
        let payer = parse_address(payer_text)?;

        let scale_text = match support.fees_support_scale.trim() {
            "" => "1",
            s => s,
        };
        let scale = parse_amount(scale_text, SCALE_DECIMALS)?;
        let supply = fee.saturating_mul(scale) / U256::exp10(SCALE_DECIMALS as usize);

        let template = transfer_request(payer, to, supply, None);
        let gas_limit = self.gas_limit(&ctx.provider, &ctx.config, &template, false).await?;
        let cost = supply.saturating_add(gas_limit.saturating_mul(ctx.gas_price));

        let state = match ctx.payers.get(&payer) {
            Some(state) => *state,
            None => {
                let state = PayerState {
                    balance: self.native_balance(&ctx.provider, payer).await?,
                    nonce: self
                        .nonce_at(&ctx.provider, payer, ctx.config.nonce_compute_mode)
                        .await?,
                };
                ctx.payers.insert(payer, state);
                state
            }
        };
        if state.balance < cost {
            return Err(WalletError::InsufficientFunds(format!(
                "fees support address {} holds {} {} and cannot pay {}",
                payer_text,
                format_amount(state.balance, ctx.config.decimals)?,
                ctx.config.symbol,
                format_amount(cost, ctx.config.decimals)?
            )));
        }
        let nonce = state.nonce;
        ctx.payers.insert(payer, PayerState { balance: state.balance - cost, nonce: nonce + 1 });

        let request = template.gas(gas_limit).gas_price(ctx.gas_price).nonce(nonce);
        self.summary_raw_transaction(
            ctx,
            Coin::native(&ctx.config.symbol),
            support.account.clone(),
            request,
            &address_to_string(&to),
            &format_amount(supply, ctx.config.decimals)?,
        )
    }

    fn summary_raw_transaction(
        &self,
        ctx: &SweepContext<P>,
        coin: Coin,
        account: AssetsAccount,
        request: TransactionRequest,
        recipient: &str,
        amount: &str,
    ) -> Result<RawTransaction, WalletError> {
        let mut to = BTreeMap::new();
        to.insert(recipient.to_string(), amount.to_string());
        let mut raw_tx = RawTransaction { coin, account, to, ..Default::default() };
        seal_raw_transaction(
            &mut raw_tx,
            request,
            ctx.chain_id,
            ctx.config.decimals,
            recipient,
            amount,
        )?;
        Ok(raw_tx)
    }
}
