//! Swap intents: market swaps, limit orders and cancellation.
//!
//! A swap deposits the input token into the user's hub wallet, which takes the
//! partner fee and creates an intent on the hub intents contract. Solvers fill
//! the intent; the runtime tells the solver API once it exists on the hub.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use tracing::{info, warn};

use crate::allowance::{AllowanceGate, AllowanceRequest, Receiver};
use crate::batch::{BatchBuilder, BatchRequest, CallBatch};
use crate::config::{ConfigService, SpokeChainConfig};
use crate::encoders::intents;
use crate::error::{ActionError, Failure, IntentError};
use crate::hub::{EvmHubService, HubService};
use crate::intent::{SwapIntent, SwapParams, hash_intent, new_intent_id};
use crate::relay::RelayClient;
use crate::settlement::{settle, submitted_hash};
use crate::solver_client::SolverApiClient;
use crate::spoke::{DepositRequest, SpokeService, WalletCallRequest};
use crate::types::{Action, SettledIntent, TxResult};

pub type SwapError = ActionError<SwapParams>;

/// Settled swap with the intent as created on the hub.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub spoke_tx_hash: String,
    pub hub_tx_hash: String,
    pub intent: SwapIntent,
    pub intent_hash: String,
    /// Partner fee taken, in hub asset units.
    pub fee: U256,
}

#[derive(Debug, Clone)]
pub struct CreatedSwapIntent {
    pub tx: TxResult,
    pub hub_wallet: Address,
    pub batch: CallBatch,
    pub intent: SwapIntent,
    pub intent_hash: String,
}

pub struct SwapService {
    config: Arc<ConfigService>,
    hub: Arc<dyn HubService>,
    relay: RelayClient,
    batch: BatchBuilder,
    allowance: AllowanceGate,
    solver: Option<SolverApiClient>,
}

impl SwapService {
    /// The solver client is taken from config when an endpoint is set.
    pub fn new(config: Arc<ConfigService>, hub: Arc<dyn HubService>, relay: RelayClient) -> Self {
        let batch = BatchBuilder::from_config(&config);
        let allowance = AllowanceGate::new(config.clone(), hub.clone());
        let solver = config.solver().map(SolverApiClient::from_config);
        Self {
            config,
            hub,
            relay,
            batch,
            allowance,
            solver,
        }
    }

    pub fn from_config(config: Arc<ConfigService>) -> Result<Self, IntentError> {
        let hub: Arc<dyn HubService> = Arc::new(EvmHubService::from_config(&config)?);
        let relay = RelayClient::from_config(config.relay());
        Ok(Self::new(config, hub, relay))
    }

    pub fn with_solver(mut self, solver: Option<SolverApiClient>) -> Self {
        self.solver = solver;
        self
    }

    pub async fn swap(
        &self,
        params: SwapParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SwapOutcome, SwapError> {
        let timeout = timeout.unwrap_or(self.relay.default_timeout());
        let result = async {
            let created = self
                .create_inner(&params, spoke, false)
                .await
                .map_err(Failure::classify)?;
            let tx_hash = submitted_hash(created.tx, &spoke.chain().chain_id)?;
            let needs_relay =
                !self.config.is_hub_chain(&spoke.chain().chain_id) || created.batch.bridges_out;
            let settled = settle(spoke, &self.relay, tx_hash, needs_relay, timeout).await?;
            self.notify_solver(&settled.hub_tx_hash).await?;
            Ok::<_, Failure>(SwapOutcome {
                spoke_tx_hash: settled.spoke_tx_hash,
                hub_tx_hash: settled.hub_tx_hash,
                intent: created.intent,
                intent_hash: created.intent_hash,
                fee: created.batch.fee,
            })
        }
        .await;

        match result {
            Ok(outcome) => {
                info!(
                    intent_hash = %outcome.intent_hash,
                    spoke_tx_hash = %outcome.spoke_tx_hash,
                    hub_tx_hash = %outcome.hub_tx_hash,
                    "swap intent created"
                );
                Ok(outcome)
            }
            Err(failure) => Err(failure.into_action_error(Action::Swap, params)),
        }
    }

    /// Swap with no deadline. The order stays open until filled or cancelled.
    pub async fn create_limit_order(
        &self,
        mut params: SwapParams,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SwapOutcome, SwapError> {
        params.deadline = 0;
        self.swap(params, spoke, timeout).await
    }

    pub async fn create_swap_intent(
        &self,
        params: SwapParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedSwapIntent, SwapError> {
        match self.create_inner(&params, spoke, raw).await {
            Ok(created) => Ok(created),
            Err(e) => Err(Failure::classify(e).into_action_error(Action::Swap, params)),
        }
    }

    /// Cancel an open intent from the creator's hub wallet. `spoke` must be
    /// the chain the intent was created from.
    pub async fn cancel_intent(
        &self,
        intent: &SwapIntent,
        spoke: &dyn SpokeService,
        timeout: Option<Duration>,
    ) -> Result<SettledIntent, ActionError<SwapIntent>> {
        let timeout = timeout.unwrap_or(self.relay.default_timeout());
        let result = async {
            let from = spoke.wallet_address().await.map_err(Failure::classify)?;
            let hub_wallet = self
                .hub
                .user_hub_wallet_address(&from, spoke.chain())
                .await
                .map_err(Failure::classify)?;
            if hub_wallet != intent.creator {
                return Err(Failure::Create(IntentError::ValidationFailed(format!(
                    "intent was created by {}, not {hub_wallet}",
                    intent.creator
                ))));
            }

            let call = intents::cancel_intent(self.config.hub_chain().intents, intent.to_sol());
            let request = WalletCallRequest {
                from,
                hub_wallet,
                calls: vec![call],
            };
            let tx = spoke
                .call_wallet(&request, false)
                .await
                .map_err(Failure::classify)?;
            let tx_hash = submitted_hash(tx, &spoke.chain().chain_id)?;
            let needs_relay = !self.config.is_hub_chain(&spoke.chain().chain_id);
            settle(spoke, &self.relay, tx_hash, needs_relay, timeout).await
        }
        .await;

        match result {
            Ok(settled) => {
                info!(intent_id = %intent.intent_id, hub_tx_hash = %settled.hub_tx_hash, "intent cancelled");
                Ok(settled)
            }
            Err(failure) => Err(failure.into_action_error(Action::Swap, intent.clone())),
        }
    }

    pub async fn is_allowance_valid(
        &self,
        params: SwapParams,
        spoke: &dyn SpokeService,
        destination: Option<&dyn SpokeService>,
    ) -> Result<bool, SwapError> {
        let result = async {
            validate(&params)?;
            let owner = spoke.wallet_address().await?;
            let receiver = params.dst_address.as_deref().unwrap_or(&owner);
            let request = AllowanceRequest {
                action: Action::Swap,
                token: &params.input_token,
                amount: params.input_amount,
                owner: &owner,
                receiver: Some(Receiver {
                    account: receiver,
                    token: &params.output_token,
                    amount: params.min_output_amount,
                }),
            };
            self.allowance.is_valid(&request, spoke, destination).await
        }
        .await;
        result.map_err(|e| Failure::classify(e).into_action_error(Action::Swap, params))
    }

    pub async fn approve(
        &self,
        params: SwapParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<TxResult, SwapError> {
        let result = async {
            validate(&params)?;
            let owner = spoke.wallet_address().await?;
            let request = AllowanceRequest {
                action: Action::Swap,
                token: &params.input_token,
                amount: params.input_amount,
                owner: &owner,
                receiver: None,
            };
            self.allowance.approve(&request, spoke, raw).await
        }
        .await;
        result.map_err(|e| Failure::classify(e).into_action_error(Action::Swap, params))
    }

    async fn notify_solver(&self, hub_tx_hash: &str) -> Result<(), Failure> {
        let Some(solver) = &self.solver else {
            return Ok(());
        };
        solver.post_execution(hub_tx_hash).await.map_err(|e| {
            warn!(%hub_tx_hash, error = %e, "solver notification failed");
            Failure::Other(IntentError::SolverError(format!(
                "intent is on the hub in {hub_tx_hash} but the solver was not notified: {e}"
            )))
        })?;
        Ok(())
    }

    async fn create_inner(
        &self,
        params: &SwapParams,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<CreatedSwapIntent, IntentError> {
        validate(params)?;
        let source = spoke.chain();
        let from = spoke.wallet_address().await?;
        let destination: SpokeChainConfig = match &params.dst_chain_id {
            Some(chain_id) => self.config.spoke_chain(chain_id)?.clone(),
            None => source.clone(),
        };
        let dst_address = params.dst_address.clone().unwrap_or_else(|| from.clone());

        let input = self.config.hub_asset_info(&source.chain_id, &params.input_token)?;
        let output = self
            .config
            .hub_asset_info(&destination.chain_id, &params.output_token)?;
        let hub_wallet = self.hub.user_hub_wallet_address(&from, source).await?;

        let draft = SwapIntent {
            intent_id: new_intent_id(),
            creator: hub_wallet,
            input_token: input.asset,
            output_token: output.asset,
            input_amount: params.input_amount,
            min_output_amount: params.min_output_amount,
            deadline: params.deadline,
            allow_partial_fill: params.allow_partial_fill,
            src_chain: source.relay_chain_id,
            dst_chain: destination.relay_chain_id,
            src_address: source.family.encode_address(&from)?,
            dst_address: destination.family.encode_address(&dst_address)?,
            solver: params.solver,
            data: params.data.clone(),
        };

        let batch = self.batch.build(&BatchRequest {
            action: Action::Swap,
            asset: input,
            amount: params.input_amount,
            hub_wallet,
            on_behalf_of: hub_wallet,
            destination: None,
            intent: Some(draft),
        })?;
        let intent = batch
            .intent
            .clone()
            .ok_or_else(|| IntentError::EncodingError("swap batch has no intent".into()))?;
        let intent_hash = hash_intent(&intent);

        let request = DepositRequest {
            from,
            token: params.input_token.clone(),
            amount: params.input_amount,
            hub_wallet,
            calls: batch.calls.clone(),
        };
        let tx = spoke.deposit(&request, raw).await?;

        Ok(CreatedSwapIntent {
            tx,
            hub_wallet,
            batch,
            intent,
            intent_hash,
        })
    }
}

fn validate(params: &SwapParams) -> Result<(), IntentError> {
    if params.input_amount.is_zero() {
        return Err(IntentError::ValidationFailed("input_amount must be positive".into()));
    }
    if params.input_token.trim().is_empty() || params.output_token.trim().is_empty() {
        return Err(IntentError::ValidationFailed("swap tokens must be set".into()));
    }
    if params.dst_chain_id.is_some() != params.dst_address.is_some() {
        return Err(IntentError::ValidationFailed(
            "dst_chain_id and dst_address must be given together".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn params() -> SwapParams {
        SwapParams {
            input_token: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".into(),
            output_token: "0x0000000000000000000000000000000000000000".into(),
            input_amount: U256::from(1_000_000u64),
            min_output_amount: U256::from(1u64),
            deadline: 0,
            allow_partial_fill: false,
            dst_chain_id: None,
            dst_address: None,
            solver: Address::ZERO,
            data: Bytes::new(),
        }
    }

    #[test]
    fn test_validate_swap_params() {
        assert!(validate(&params()).is_ok());

        let mut p = params();
        p.input_amount = U256::ZERO;
        assert!(validate(&p).is_err());

        let mut p = params();
        p.output_token = String::new();
        assert!(validate(&p).is_err());

        let mut p = params();
        p.dst_address = Some("0x01".into());
        assert!(validate(&p).is_err());
    }
}
