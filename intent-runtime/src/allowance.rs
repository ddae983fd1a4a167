//! Allowance and trustline checks before value-bearing actions.
//!
//! The spender is the user's router when the source is the hub chain and the
//! spoke asset manager otherwise. Stellar has no allowances; it needs a
//! trustline with enough headroom on every Stellar account involved.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::debug;

use crate::config::ConfigService;
use crate::encoders::erc20;
use crate::error::IntentError;
use crate::hub::HubService;
use crate::spoke::SpokeService;
use crate::types::{Action, ChainFamily, TxResult, parse_address};

/// Receiving side of an action, checked when it lives on a trustline chain.
#[derive(Debug, Clone, Copy)]
pub struct Receiver<'a> {
    pub account: &'a str,
    pub token: &'a str,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct AllowanceRequest<'a> {
    pub action: Action,
    /// Token on the source chain.
    pub token: &'a str,
    pub amount: U256,
    /// Sending account on the source chain.
    pub owner: &'a str,
    pub receiver: Option<Receiver<'a>>,
}

#[derive(Clone)]
pub struct AllowanceGate {
    config: Arc<ConfigService>,
    hub: Arc<dyn HubService>,
}

impl AllowanceGate {
    pub fn new(config: Arc<ConfigService>, hub: Arc<dyn HubService>) -> Self {
        Self { config, hub }
    }

    /// Contract that pulls the tokens on `spoke`, in the family's format.
    pub async fn spender(&self, spoke: &dyn SpokeService, owner: &str) -> Result<String, IntentError> {
        match spoke.family() {
            ChainFamily::Hub => {
                let router = self.hub.user_router(parse_address(owner)?).await?;
                Ok(router.to_string())
            }
            ChainFamily::Evm
            | ChainFamily::Solana
            | ChainFamily::Sui
            | ChainFamily::Stellar
            | ChainFamily::Injective
            | ChainFamily::Icon
            | ChainFamily::Near => Ok(spoke.chain().asset_manager.clone()),
        }
    }

    pub async fn is_valid(
        &self,
        request: &AllowanceRequest<'_>,
        spoke: &dyn SpokeService,
        destination: Option<&dyn SpokeService>,
    ) -> Result<bool, IntentError> {
        if request.action.is_value_bearing() && !self.source_ok(request, spoke).await? {
            return Ok(false);
        }

        if !request.action.delivers_funds() {
            return Ok(true);
        }
        if let (Some(dest), Some(receiver)) = (destination, request.receiver) {
            if dest.family() == ChainFamily::Stellar {
                return dest
                    .has_sufficient_trustline(receiver.token, receiver.amount, receiver.account)
                    .await;
            }
        }
        Ok(true)
    }

    async fn source_ok(
        &self,
        request: &AllowanceRequest<'_>,
        spoke: &dyn SpokeService,
    ) -> Result<bool, IntentError> {
        match spoke.family() {
            ChainFamily::Hub | ChainFamily::Evm => {
                if self.config.is_native_token(&spoke.chain().chain_id, request.token) {
                    return Ok(true);
                }
                let spender = self.spender(spoke, request.owner).await?;
                let allowance = spoke.allowance(request.token, request.owner, &spender).await?;
                debug!(token = request.token, %spender, %allowance, "checked allowance");
                Ok(allowance >= request.amount)
            }
            ChainFamily::Stellar => {
                spoke
                    .has_sufficient_trustline(request.token, request.amount, request.owner)
                    .await
            }
            ChainFamily::Solana
            | ChainFamily::Sui
            | ChainFamily::Injective
            | ChainFamily::Icon
            | ChainFamily::Near => Ok(true),
        }
    }

    /// Approve the spender for `request.amount`, or open a trustline on
    /// Stellar.
    pub async fn approve(
        &self,
        request: &AllowanceRequest<'_>,
        spoke: &dyn SpokeService,
        raw: bool,
    ) -> Result<TxResult, IntentError> {
        if !request.action.is_value_bearing() {
            return Err(IntentError::ValidationFailed(format!(
                "{} needs no approval on the source chain",
                request.action
            )));
        }
        match spoke.family() {
            ChainFamily::Hub | ChainFamily::Evm => {
                if self.config.is_native_token(&spoke.chain().chain_id, request.token) {
                    return Err(IntentError::ValidationFailed(
                        "native token needs no approval".into(),
                    ));
                }
                let spender = parse_address(&self.spender(spoke, request.owner).await?)?;
                let call = erc20::approve(parse_address(request.token)?, spender, request.amount);
                spoke.send_call(&call, raw).await
            }
            ChainFamily::Stellar => spoke.request_trustline(request.token, request.amount, raw).await,
            family @ (ChainFamily::Solana
            | ChainFamily::Sui
            | ChainFamily::Injective
            | ChainFamily::Icon
            | ChainFamily::Near) => Err(IntentError::UnsupportedOperation {
                operation: "approve".into(),
                family: family.to_string(),
            }),
        }
    }
}
