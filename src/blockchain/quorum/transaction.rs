use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, Middleware};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Signature, TransactionRequest, H256, U256};
use ethers::utils::keccak256;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{abi, address_to_string, parse_address, rpc_error, QuorumWalletManager};
use crate::core::domain::{
    KeySignature, RawTransaction, RawTransactionWithError, SummaryRawTransaction, Transaction,
};
use crate::core::units::{format_amount, parse_amount};
use crate::core::WalletError;
use crate::openw::adapter::{AssetsAdapter, TransactionDecoder};

/// Unsigned transfer of `amount` from `from` to `to`; a token transfer when `token` is set.
pub(crate) fn transfer_request(
    from: Address,
    to: Address,
    amount: U256,
    token: Option<Address>,
) -> TransactionRequest {
    match token {
        Some(token) => TransactionRequest::new()
            .from(from)
            .to(token)
            .value(U256::zero())
            .data(abi::encode_transfer(&to, amount)),
        None => TransactionRequest::new().from(from).to(to).value(amount),
    }
}

/// Stores a fully priced request in `raw_tx` together with the digest its sender must sign.
///
/// `request` must carry sender, nonce, gas and gas price.
pub(crate) fn seal_raw_transaction(
    raw_tx: &mut RawTransaction,
    request: TransactionRequest,
    chain_id: u64,
    native_decimals: u8,
    recipient: &str,
    amount: &str,
) -> Result<(), WalletError> {
    let from = request
        .from
        .ok_or_else(|| WalletError::TransactionFailed("transaction has no sender".into()))?;
    let gas = request.gas.unwrap_or_default();
    let gas_price = request.gas_price.unwrap_or_default();
    let fee = gas
        .checked_mul(gas_price)
        .ok_or_else(|| WalletError::InvalidAmount("fee out of range".into()))?;

    let typed = TypedTransaction::Legacy(request.chain_id(chain_id));
    let sighash = typed.sighash();
    let from = address_to_string(&from);

    raw_tx.raw_hex = hex::encode(serde_json::to_vec(&typed)?);
    raw_tx.chain_id = chain_id;
    raw_tx.fee_rate = format_amount(gas_price, native_decimals)?;
    raw_tx.fees = format_amount(fee, native_decimals)?;
    raw_tx.signatures = vec![KeySignature {
        address: from.clone(),
        message: format!("{:#x}", sighash),
        signature: String::new(),
    }];
    raw_tx.tx_from = vec![format!("{}:{}", from, amount)];
    raw_tx.tx_to = vec![format!("{}:{}", recipient, amount)];
    raw_tx.tx_amount = amount.to_string();
    raw_tx.signed_hex.clear();
    raw_tx.tx_id.clear();
    raw_tx.is_built = true;
    raw_tx.is_completed = false;
    raw_tx.is_submit = false;
    Ok(())
}

fn decode_unsigned(raw_tx: &RawTransaction) -> Result<TypedTransaction, WalletError> {
    if raw_tx.raw_hex.is_empty() {
        return Err(WalletError::TransactionFailed("transaction has not been built".into()));
    }
    let bytes = hex::decode(raw_tx.raw_hex.trim_start_matches("0x"))?;
    let mut typed: TypedTransaction = serde_json::from_slice(&bytes)?;
    typed.set_chain_id(raw_tx.chain_id);
    Ok(typed)
}

/// Compact form stored in [`KeySignature::signature`]: r ‖ s ‖ recovery id.
fn encode_signature(sig: &Signature) -> String {
    let mut out = [0u8; 65];
    sig.r.to_big_endian(&mut out[0..32]);
    sig.s.to_big_endian(&mut out[32..64]);
    out[64] = recovery_byte(sig.v);
    hex::encode(out)
}

fn decode_signature(text: &str, chain_id: u64) -> Result<Signature, WalletError> {
    let bytes = hex::decode(text.trim_start_matches("0x"))?;
    if bytes.len() != 65 {
        return Err(WalletError::VerificationFailed(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }
    let recid = recovery_byte(bytes[64] as u64) as u64;
    let v = chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35 + recid))
        .ok_or_else(|| {
            WalletError::VerificationFailed(format!("chain id {} out of range", chain_id))
        })?;
    Ok(Signature {
        r: U256::from_big_endian(&bytes[0..32]),
        s: U256::from_big_endian(&bytes[32..64]),
        v,
    })
}

fn recovery_byte(v: u64) -> u8 {
    match v {
        0 | 1 => v as u8,
        27 | 28 => (v - 27) as u8,
        v => ((v - 1) % 2) as u8,
    }
}

/// Nonce forced by the caller through `ext_param["nonce"]`.
pub(crate) fn nonce_override(
    ext_param: &HashMap<String, serde_json::Value>,
) -> Result<Option<U256>, WalletError> {
    let Some(value) = ext_param.get("nonce") else {
        return Ok(None);
    };
    let nonce = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    nonce
        .map(|n| Some(U256::from(n)))
        .ok_or_else(|| WalletError::InvalidInput(format!("invalid nonce: {}", value)))
}

#[async_trait]
impl<P> TransactionDecoder for QuorumWalletManager<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    async fn create_raw_transaction(&self, raw_tx: &mut RawTransaction) -> Result<(), WalletError> {
        let provider = self.provider()?;
        let config = self.current_config();

        let (recipient, amount_text) = raw_tx.single_recipient()?;
        let (recipient, amount_text) = (recipient.to_string(), amount_text.to_string());
        let to = parse_address(&recipient)?;

        let token = if raw_tx.coin.is_contract {
            let contract = raw_tx.coin.contract.as_ref().ok_or_else(|| {
                WalletError::InvalidInput("token transfer without contract".into())
            })?;
            Some((parse_address(&contract.address)?, contract.decimals))
        } else {
            None
        };
        let decimals = token.map(|(_, d)| d).unwrap_or(config.decimals);
        let amount = parse_amount(&amount_text, decimals)?;
        if amount.is_zero() {
            return Err(WalletError::InvalidAmount("amount must be greater than zero".into()));
        }

        let gas_price = self.gas_price(&provider, &raw_tx.fee_rate, config.decimals).await?;
        let chain_id = self.chain_id(&provider, &config).await?;

        let mut chosen = None;
        for address in &raw_tx.account.addresses {
            let from = parse_address(address)?;
            // an ERC-20 transfer from an unfunded address reverts eth_estimateGas
            if let Some((token_address, _)) = token {
                if self.token_balance(&provider, token_address, from).await? < amount {
                    debug!("{} holds less than {} {}", address, amount_text, raw_tx.coin.symbol);
                    continue;
                }
            }

            let request = transfer_request(from, to, amount, token.map(|(t, _)| t));
            let gas_limit = self.gas_limit(&provider, &config, &request, token.is_some()).await?;
            let fee = gas_limit.saturating_mul(gas_price);

            let native = self.native_balance(&provider, from).await?;
            let enough = match token {
                None => native >= amount.saturating_add(fee),
                Some(_) => native >= fee,
            };
            if enough {
                chosen = Some((from, request.gas(gas_limit)));
                break;
            }
            debug!("{} cannot pay {} {} plus fees", address, amount_text, raw_tx.coin.symbol);
        }

        let (from, request) = chosen.ok_or_else(|| {
            WalletError::InsufficientFunds(format!(
                "no address of account {} can pay {} {} plus fees",
                raw_tx.account.account_id, amount_text, raw_tx.coin.symbol
            ))
        })?;

        let nonce = match nonce_override(&raw_tx.ext_param)? {
            Some(nonce) => nonce,
            None => self.nonce_at(&provider, from, config.nonce_compute_mode).await?,
        };
        let request = request.nonce(nonce).gas_price(gas_price);

        seal_raw_transaction(raw_tx, request, chain_id, config.decimals, &recipient, &amount_text)?;
        self.logger().info(format!(
            "raw transaction built: {} {} from {} to {}",
            amount_text,
            raw_tx.coin.symbol,
            address_to_string(&from),
            recipient
        ));
        Ok(())
    }

    async fn sign_raw_transaction(
        &self,
        raw_tx: &mut RawTransaction,
        keys: &[LocalWallet],
    ) -> Result<(), WalletError> {
        let typed = decode_unsigned(raw_tx)?;

        for key_sig in raw_tx.signatures.iter_mut() {
            let owner = parse_address(&key_sig.address)?;
            let Some(wallet) = keys.iter().find(|k| k.address() == owner) else {
                return Err(WalletError::SigningFailed(format!(
                    "no key supplied for {}",
                    key_sig.address
                )));
            };
            let sig = wallet
                .sign_transaction_sync(&typed)
                .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
            key_sig.signature = encode_signature(&sig);
            debug!("signed {} for {}", key_sig.message, key_sig.address);
        }
        Ok(())
    }

    async fn verify_raw_transaction(&self, raw_tx: &mut RawTransaction) -> Result<(), WalletError> {
        let typed = decode_unsigned(raw_tx)?;
        let sighash = typed.sighash();
        let expected_message = format!("{:#x}", sighash);

        let key_sig = match raw_tx.signatures.as_slice() {
            [one] => one,
            [] => return Err(WalletError::VerificationFailed("no signature required".into())),
            _ => {
                return Err(WalletError::Unsupported(
                    "transactions with several signers are not supported".into(),
                ))
            }
        };
        if key_sig.signature.is_empty() {
            return Err(WalletError::VerificationFailed(format!(
                "{} has not signed",
                key_sig.address
            )));
        }
        if !key_sig.message.eq_ignore_ascii_case(&expected_message) {
            return Err(WalletError::VerificationFailed(
                "signed message does not match the transaction".into(),
            ));
        }

        let owner = parse_address(&key_sig.address)?;
        let sig = decode_signature(&key_sig.signature, raw_tx.chain_id)?;
        sig.verify(sighash, owner)
            .map_err(|e| WalletError::VerificationFailed(format!("{}: {}", key_sig.address, e)))?;

        let signed = typed.rlp_signed(&sig);
        raw_tx.tx_id = format!("{:#x}", H256::from(keccak256(&signed)));
        raw_tx.signed_hex = hex::encode(&signed);
        raw_tx.is_completed = true;
        debug!("verified transaction {}", raw_tx.tx_id);
        Ok(())
    }

    async fn submit_raw_transaction(
        &self,
        raw_tx: &mut RawTransaction,
    ) -> Result<Transaction, WalletError> {
        if !raw_tx.is_completed || raw_tx.signed_hex.is_empty() {
            return Err(WalletError::TransactionFailed("transaction is not verified".into()));
        }
        let provider = self.provider()?;
        let signed = hex::decode(raw_tx.signed_hex.trim_start_matches("0x"))?;

        let pending = provider
            .send_raw_transaction(Bytes::from(signed))
            .await
            .map_err(|e| WalletError::TransactionFailed(format!("Failed to send transaction: {}", e)))?;
        let tx_hash = format!("{:#x}", pending.tx_hash());
        if !raw_tx.tx_id.is_empty() && !raw_tx.tx_id.eq_ignore_ascii_case(&tx_hash) {
            warn!("node reported hash {} for local transaction {}", tx_hash, raw_tx.tx_id);
        }
        info!(tx_hash = %tx_hash, "Transaction sent");

        raw_tx.tx_id = tx_hash.clone();
        raw_tx.is_submit = true;

        Ok(Transaction {
            tx_id: tx_hash,
            coin: raw_tx.coin.clone(),
            account_id: raw_tx.account.account_id.clone(),
            from: raw_tx.tx_from.clone(),
            to: raw_tx.tx_to.clone(),
            amount: raw_tx.tx_amount.clone(),
            fees: raw_tx.fees.clone(),
            submit_time: chrono::Utc::now().timestamp(),
        })
    }

    async fn create_summary_raw_transaction(
        &self,
        sum_raw_tx: &SummaryRawTransaction,
    ) -> Result<Vec<RawTransactionWithError>, WalletError> {
        self.build_summary_transactions(sum_raw_tx).await
    }

    async fn get_raw_transaction_fee_rate(&self) -> Result<(String, String), WalletError> {
        let provider = self.provider()?;
        let decimals = self.decimals();
        let gas_price = provider
            .get_gas_price()
            .await
            .map_err(|e| rpc_error("Failed to get gas price", e))?;
        Ok((format_amount(gas_price, decimals)?, "Gas".to_string()))
    }
}
