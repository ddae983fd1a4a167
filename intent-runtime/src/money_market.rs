//! Money market orchestration: supply, borrow, withdraw and repay.
//!
//! Flow per action:
//! 1. Validate the parameters
//! 2. Resolve the source and destination hub wallets
//! 3. Build the hub call batch
//! 4. Submit on the source chain (deposit or wallet call)
//! 5. Verify the source transaction
//! 6. Relay to the hub unless the batch already executed there
//!
//! `create_*_intent` stops after step 4 for callers that relay themselves.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tracing::{debug, info};

use crate::allowance::{AllowanceGate, AllowanceRequest, Receiver};
use crate::batch::{BatchBuilder, BatchRequest, CallBatch, Destination};
use crate::config::{ConfigService, SpokeChainConfig};
use crate::error::{ActionError, Failure, IntentError};
use crate::hub::{EvmHubService, HubService};
use crate::relay::RelayClient;
use crate::settlement::{settle, submitted_hash};
use crate::spoke::{DepositRequest, SpokeService, WalletCallRequest};
use crate::types::{
    Action, ActionParams, GasEstimate, HubAssetInfo, RawTransaction, SettledIntent, TxResult,
    parse_address,
};

pub type MoneyMarketError = ActionError<ActionParams>;

/// Source transaction of a created intent, before verification and relay.
#[derive(Debug, Clone)]
pub struct CreatedIntent {
    pub tx: TxResult,
    /// Hub wallet that executes the batch.
    pub hub_wallet: Address,
    pub batch: CallBatch,
}

/// Parameters with every default filled in.
struct Resolved {
    from_address: String,
    destination: SpokeChainConfig,
    to_address: String,
    asset: HubAssetInfo,
    from_hub_wallet: Address,
    to_hub_wallet: Address,
}

pub struct MoneyMarketService {
    config: Arc<ConfigService>,
    hub: Arc<dyn HubService>,
    relay: RelayClient,
    batch: BatchBuilder,
    allowance: AllowanceGate,
}

impl MoneyMarketService {
    pub fn new(config: Arc<ConfigService>, hub: Arc<dyn HubService>, relay: RelayClient) -> Self {
        let batch = BatchBuilder::from_config(&config);
        let allowance = AllowanceGate::new(config.clone(), hub.clone());
        Self {
            config,
            hub,
            relay,
            batch,
            allowance,
        }
    }

    /// Hub wallet lookups over the configured hub RPC, relay from config.
    pub fn from_config(config: Arc<ConfigService>) -> Result<Self, IntentError> {
        let hub: Arc<dyn HubService> = Arc::new(EvmHubService::from_config(&config)?);
        let relay = RelayClient::from_config(config.relay());
        Ok(Self::new(config, hub, relay))
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    pub async fn supply(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, MoneyMarketError> {
        self.execute(Action::Supply, params, spoke, timeout).await
    }

    pub async fn borrow(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, MoneyMarketError> {
        self.execute(Action::Borrow, params, spoke, timeout).await
    }

    pub async fn withdraw(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, MoneyMarketError> {
        self.execute(Action::Withdraw, params, spoke, timeout).await
    }

    pub async fn repay(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, MoneyMarketError> {
        self.execute(Action::Repay, params, spoke, timeout).await
    }

    pub async fn create_supply_intent(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, MoneyMarketError> {
        self.create(Action::Supply, params, spoke, raw).await
    }

    pub async fn create_borrow_intent(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, MoneyMarketError> {
        self.create(Action::Borrow, params, spoke, raw).await
    }

    pub async fn create_withdraw_intent(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, MoneyMarketError> {
        self.create(Action::Withdraw, params, spoke, raw).await
    }

    pub async fn create_repay_intent(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, MoneyMarketError> {
        self.create(Action::Repay, params, spoke, raw).await
    }

    /// Build the hub call batch without submitting anything.
    pub async fn build_calls(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
    ) -> Result<CallBatch, MoneyMarketError> {
        let action = params.action;
        match self.prepare(action, &params, spoke).await {
            Ok((_, batch)) => Ok(batch),
            Err(e) => Err(Failure::classify(e).into_action_error(action, params)),
        }
    }

    pub async fn is_allowance_valid(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        destination: Option<&dyn SpokeService>,
    ) -> Result<bool, MoneyMarketError> {
        let action = params.action;
        let result = async {
            validate(action, &params)?;
            let owner = self.owner(&params, spoke).await?;
            let to_address = params.to_address.as_deref().unwrap_or(&owner);
            let request = AllowanceRequest {
                action,
                token: &params.token,
                amount: params.amount,
                owner: &owner,
                receiver: action.delivers_funds().then_some(Receiver {
                    account: to_address,
                    token: &params.token,
                    amount: params.amount,
                }),
            };
            self.allowance.is_valid(&request, spoke, destination).await
        }
        .await;
        result.map_err(|e| Failure::classify(e).into_action_error(action, params))
    }

    pub async fn approve(
        &self,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<TxResult, MoneyMarketError> {
        let action = params.action;
        let result = async {
            validate(action, &params)?;
            let owner = self.owner(&params, spoke).await?;
            let request = AllowanceRequest {
                action,
                token: &params.token,
                amount: params.amount,
                owner: &owner,
                receiver: None,
            };
            self.allowance.approve(&request, spoke, raw).await
        }
        .await;
        result.map_err(|e| Failure::classify(e).into_action_error(action, params))
    }

    pub async fn estimate_gas(
        &self,
        tx: &RawTransaction,
        spoke: &dyn SpokeService,
    ) -> Result<GasEstimate, IntentError> {
        spoke.estimate_gas(tx).await
    }

    async fn owner(&self, params: &ActionParams, spoke: &dyn SpokeService) -> Result<String, IntentError> {
        match &params.from_address {
            Some(address) => Ok(address.clone()),
            None => spoke.wallet_address().await,
        }
    }

    async fn execute(
        &self,
        action: Action,
        params: ActionParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, MoneyMarketError> {
        let timeout = timeout.unwrap_or(self.relay.default_timeout());
        let result = async {
            let created = self
                .create_inner(action, &params, spoke, false)
                .await
                .map_err(Failure::classify)?;
            let tx_hash = submitted_hash(created.tx, &spoke.chain().chain_id)?;
            let needs_relay =
                !self.config.is_hub_chain(&spoke.chain().chain_id) || created.batch.bridges_out;
            debug!(%action, %tx_hash, needs_relay, "source transaction submitted");
            settle(spoke, &self.relay, tx_hash, needs_relay, timeout).await
        }
        .await;

        match result {
            Ok(settled) => {
                info!(
                    %action,
                    spoke_tx_hash = %settled.spoke_tx_hash,
                    hub_tx_hash = %settled.hub_tx_hash,
                    "intent settled"
                );
                Ok(settled)
            }
            Err(failure) => Err(failure.into_action_error(action, params)),
        }
    }

    async fn create(
        &self,
        action: Action,
        params: ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, MoneyMarketError> {
        match self.create_inner(action, &params, spoke, raw).await {
            Ok(created) => Ok(created),
            Err(e) => Err(Failure::classify(e).into_action_error(action, params)),
        }
    }

    async fn create_inner(
        &self,
        action: Action,
        params: &ActionParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedIntent, IntentError> {
        let (resolved, batch) = self.prepare(action, params, spoke).await?;
        let hub_wallet = resolved.from_hub_wallet;

        let tx = if action.is_value_bearing() {
            let request = DepositRequest {
                from: resolved.from_address.clone(),
                token: params.token.clone(),
                amount: params.amount,
                hub_wallet,
                calls: batch.calls.clone(),
            };
            spoke.deposit(&request, raw).await?
        } else {
            let request = WalletCallRequest {
                from: resolved.from_address.clone(),
                hub_wallet,
                calls: batch.calls.clone(),
            };
            spoke.call_wallet(&request, raw).await?
        };

        Ok(CreatedIntent {
            tx,
            hub_wallet,
            batch,
        })
    }

    async fn prepare(
        &self,
        action: Action,
        params: &ActionParams,
        spoke: &dyn SpokeService,
    ) -> Result<(Resolved, CallBatch), IntentError> {
        validate(action, params)?;
        let resolved = self.resolve(action, params, spoke).await?;

        let destination = match action {
            Action::Borrow | Action::Withdraw => Some(self.destination(&resolved)?),
            Action::Supply | Action::Repay | Action::Swap => None,
        };
        let on_behalf_of = match action {
            Action::Supply | Action::Repay => resolved.to_hub_wallet,
            Action::Borrow | Action::Withdraw | Action::Swap => resolved.from_hub_wallet,
        };

        let batch = self.batch.build(&BatchRequest {
            action,
            asset: resolved.asset,
            amount: params.amount,
            hub_wallet: resolved.from_hub_wallet,
            on_behalf_of,
            destination,
            intent: None,
        })?;
        debug!(%action, calls = batch.calls.len(), bridges_out = batch.bridges_out, "built call batch");
        Ok((resolved, batch))
    }

    async fn resolve(
        &self,
        action: Action,
        params: &ActionParams,
        spoke: &dyn SpokeService,
    ) -> Result<Resolved, IntentError> {
        let source = match &params.from_chain_id {
            Some(chain_id) => self.config.spoke_chain(chain_id)?.clone(),
            None => spoke.chain().clone(),
        };
        let from_address = self.owner(params, spoke).await?;
        if from_address.trim().is_empty() {
            return Err(IntentError::ValidationFailed("source address is empty".into()));
        }

        let destination = match &params.to_chain_id {
            Some(chain_id) => self.config.spoke_chain(chain_id)?.clone(),
            None => source.clone(),
        };
        let to_address = params
            .to_address
            .clone()
            .unwrap_or_else(|| from_address.clone());

        // Borrow and withdraw name the token they deliver.
        let token_chain = match action {
            Action::Borrow | Action::Withdraw => &destination.chain_id,
            Action::Supply | Action::Repay | Action::Swap => &spoke.chain().chain_id,
        };
        if !self.config.is_supported_token(token_chain, &params.token) {
            return Err(IntentError::UnsupportedToken {
                chain: token_chain.to_string(),
                token: params.token.clone(),
            });
        }
        let asset = self.config.hub_asset_info(token_chain, &params.token)?;

        let (from_hub_wallet, to_hub_wallet) = futures::try_join!(
            self.hub.user_hub_wallet_address(&from_address, &source),
            self.hub.user_hub_wallet_address(&to_address, &destination),
        )?;

        Ok(Resolved {
            from_address,
            destination,
            to_address,
            asset,
            from_hub_wallet,
            to_hub_wallet,
        })
    }

    fn destination(&self, resolved: &Resolved) -> Result<Destination, IntentError> {
        if self.config.is_hub_chain(&resolved.destination.chain_id) {
            Ok(Destination::Hub {
                recipient: parse_address(&resolved.to_address)?,
            })
        } else {
            Ok(Destination::Spoke {
                chain_id: resolved.destination.chain_id.clone(),
                recipient: resolved.destination.family.encode_address(&resolved.to_address)?,
            })
        }
    }
}

/// Local invariants that hold before any network access.
fn validate(action: Action, params: &ActionParams) -> Result<(), IntentError> {
    if params.action != action {
        return Err(IntentError::ValidationFailed(format!(
            "expected a {action} action, got {}",
            params.action
        )));
    }
    if action == Action::Swap {
        return Err(IntentError::ValidationFailed(
            "swap is not a money market action".into(),
        ));
    }
    if params.amount.is_zero() {
        return Err(IntentError::ValidationFailed("amount must be positive".into()));
    }
    if params.token.trim().is_empty() {
        return Err(IntentError::ValidationFailed("token is empty".into()));
    }
    if params.to_chain_id.is_some() != params.to_address.is_some() {
        return Err(IntentError::ValidationFailed(
            "to_chain_id and to_address must be given together".into(),
        ));
    }
    if params.from_chain_id.is_some() != params.from_address.is_some() {
        return Err(IntentError::ValidationFailed(
            "from_chain_id and from_address must be given together".into(),
        ));
    }
    if params.from_chain_id.is_some() && action != Action::Borrow {
        return Err(IntentError::ValidationFailed(format!(
            "{action} does not accept a source override"
        )));
    }
    Ok(())
}
