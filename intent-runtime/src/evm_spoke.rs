//! [`SpokeService`] for the hub chain and EVM spoke chains, backed by alloy.
//!
//! On an EVM spoke, deposits go through the spoke asset manager and wallet
//! calls through the connection contract; both ship the call batch to the hub
//! as `(address,uint256,bytes)[]`. On the hub itself the user's router pulls
//! the tokens and executes the batch directly.

use std::time::Duration;

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::{ConfigService, HubChainConfig, SpokeChainConfig};
use crate::contracts::IERC20;
use crate::encoders::{asset_manager, erc20};
use crate::error::IntentError;
use crate::spoke::{DepositRequest, SpokeService, WalletCallRequest};
use crate::types::{
    ChainFamily, ChainId, ContractCall, GasEstimate, RawTransaction, TxResult, parse_address,
};

const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_VERIFY_INTERVAL: Duration = Duration::from_secs(1);

pub struct EvmSpokeService {
    chain: SpokeChainConfig,
    hub_relay_chain_id: u64,
    wrapped_native: Address,
    provider: DynProvider,
    account: Address,
    verify_timeout: Duration,
    verify_interval: Duration,
}

impl EvmSpokeService {
    pub fn new(
        chain: SpokeChainConfig,
        hub: &HubChainConfig,
        provider: DynProvider,
        account: Address,
    ) -> Result<Self, IntentError> {
        match chain.family {
            ChainFamily::Hub | ChainFamily::Evm => {}
            ChainFamily::Solana
            | ChainFamily::Sui
            | ChainFamily::Stellar
            | ChainFamily::Injective
            | ChainFamily::Icon
            | ChainFamily::Near => {
                return Err(IntentError::ConfigError(format!(
                    "chain {} is a {} chain, not EVM",
                    chain.chain_id, chain.family
                )));
            }
        }
        Ok(Self {
            chain,
            hub_relay_chain_id: hub.relay_chain_id,
            wrapped_native: hub.wrapped_native,
            provider,
            account,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            verify_interval: DEFAULT_VERIFY_INTERVAL,
        })
    }

    /// Connect a signing service for `chain_id` using its configured RPC URL.
    pub fn connect(
        config: &ConfigService,
        chain_id: &ChainId,
        private_key: &str,
    ) -> Result<Self, IntentError> {
        let chain = config.spoke_chain(chain_id)?.clone();
        let rpc_url = chain.rpc_url.clone().ok_or_else(|| {
            IntentError::ConfigError(format!("no rpc_url configured for {chain_id}"))
        })?;
        let client = ChainClient::new(&rpc_url, private_key)?;
        let account = client.address;
        Self::new(chain, config.hub_chain(), client.into_dyn(), account)
    }

    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    pub fn with_verify_interval(mut self, interval: Duration) -> Self {
        self.verify_interval = interval;
        self
    }

    pub fn account(&self) -> Address {
        self.account
    }

    fn is_hub(&self) -> bool {
        self.chain.family == ChainFamily::Hub
    }

    fn is_native(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case(&self.chain.native_token)
    }

    fn spoke_contract(&self, address: &str, name: &str) -> Result<Address, IntentError> {
        parse_address(address).map_err(|e| IntentError::SpokeError {
            chain: self.chain.chain_id.to_string(),
            message: format!("invalid {name} address: {e}"),
        })
    }

    /// Either hand back the unsigned payload or sign and broadcast it.
    async fn dispatch(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        raw: bool,
    ) -> Result<TxResult, IntentError> {
        if raw {
            return Ok(TxResult::Raw(RawTransaction {
                from: self.account.to_string(),
                to: to.to_string(),
                value,
                data,
            }));
        }

        let request = TransactionRequest::default()
            .from(self.account)
            .to(to)
            .value(value)
            .input(data.into());

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| IntentError::SpokeError {
                chain: self.chain.chain_id.to_string(),
                message: format!("Transaction send failed: {e}"),
            })?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        info!(chain = %self.chain.chain_id, %tx_hash, "submitted spoke transaction");
        Ok(TxResult::Submitted(tx_hash))
    }
}

#[async_trait]
impl SpokeService for EvmSpokeService {
    fn chain(&self) -> &SpokeChainConfig {
        &self.chain
    }

    async fn wallet_address(&self) -> Result<String, IntentError> {
        Ok(self.account.to_string())
    }

    async fn deposit(&self, request: &DepositRequest, raw: bool) -> Result<TxResult, IntentError> {
        let native = self.is_native(&request.token);
        let value = if native { request.amount } else { U256::ZERO };

        if self.is_hub() {
            // The router pulls the funds into itself before running the batch.
            let router = request.hub_wallet;
            let pull = if native {
                erc20::wrap_native(self.wrapped_native, request.amount)
            } else {
                let token = parse_address(&request.token)?;
                let from = parse_address(&request.from)?;
                erc20::transfer_from(token, from, router, request.amount)
            };
            let mut calls = Vec::with_capacity(request.calls.len() + 1);
            calls.push(pull);
            calls.extend(request.calls.iter().cloned());
            debug!(%router, calls = calls.len(), "routing hub deposit");
            return self
                .dispatch(router, value, asset_manager::route(&calls), raw)
                .await;
        }

        let manager = self.spoke_contract(&self.chain.asset_manager, "asset manager")?;
        let token = parse_address(&request.token)?;
        let data = asset_manager::spoke_transfer(
            token,
            Bytes::copy_from_slice(request.hub_wallet.as_slice()),
            request.amount,
            asset_manager::encode_contract_calls(&request.calls),
        );
        debug!(chain = %self.chain.chain_id, hub_wallet = %request.hub_wallet, "depositing via asset manager");
        self.dispatch(manager, value, data, raw).await
    }

    async fn call_wallet(
        &self,
        request: &WalletCallRequest,
        raw: bool,
    ) -> Result<TxResult, IntentError> {
        if self.is_hub() {
            return self
                .dispatch(
                    request.hub_wallet,
                    U256::ZERO,
                    asset_manager::route(&request.calls),
                    raw,
                )
                .await;
        }

        let connection = self.spoke_contract(&self.chain.connection, "connection")?;
        let data = asset_manager::send_message(
            self.hub_relay_chain_id,
            Bytes::copy_from_slice(request.hub_wallet.as_slice()),
            asset_manager::encode_contract_calls(&request.calls),
        );
        self.dispatch(connection, U256::ZERO, data, raw).await
    }

    async fn verify_tx_hash(&self, tx_hash: &str) -> Result<bool, IntentError> {
        let hash: B256 = tx_hash
            .parse()
            .map_err(|e| IntentError::VerificationFailed(format!("invalid tx hash {tx_hash}: {e}")))?;

        let poll = async {
            loop {
                match self.provider.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => return receipt.status(),
                    Ok(None) => {}
                    Err(e) => warn!(%tx_hash, error = %e, "receipt lookup failed, retrying"),
                }
                tokio::time::sleep(self.verify_interval).await;
            }
        };

        tokio::time::timeout(self.verify_timeout, poll)
            .await
            .map_err(|_| IntentError::Timeout(format!("no receipt for {tx_hash}")))
    }

    async fn estimate_gas(&self, tx: &RawTransaction) -> Result<GasEstimate, IntentError> {
        let request = TransactionRequest::default()
            .from(parse_address(&tx.from)?)
            .to(parse_address(&tx.to)?)
            .value(tx.value)
            .input(tx.data.clone().into());
        let gas_limit = self.provider.estimate_gas(request).await?;
        Ok(GasEstimate { gas_limit })
    }

    async fn allowance(&self, token: &str, owner: &str, spender: &str) -> Result<U256, IntentError> {
        let erc20 = IERC20::new(parse_address(token)?, &self.provider);
        let allowance = erc20
            .allowance(parse_address(owner)?, parse_address(spender)?)
            .call()
            .await?;
        Ok(allowance)
    }

    async fn send_call(&self, call: &ContractCall, raw: bool) -> Result<TxResult, IntentError> {
        self.dispatch(call.address, call.value, call.data.clone(), raw)
            .await
    }
}
