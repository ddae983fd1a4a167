//! Assembly of the ordered hub call batch for one action.
//!
//! Every action maps to a fixed list of [`BatchStep`]s. The builder walks the
//! list carrying a `(token, amount)` cursor, so each step consumes what the
//! previous one produced: wrap-in, pool call, fee extraction, unwrap-out,
//! destination transfer.

use alloy::primitives::{Address, Bytes, U256};

use crate::config::ConfigService;
use crate::decimals::{translate_incoming, translate_outgoing};
use crate::encoders::{PoolEncoder, asset_manager, erc20, intents, vault_token};
use crate::error::IntentError;
use crate::fees::{PartnerFee, split_fee};
use crate::intent::SwapIntent;
use crate::types::{Action, ChainId, ContractCall, HubAssetInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStep {
    WrapIn,
    PoolCall,
    FeeExtraction,
    UnwrapOut,
    DestinationTransfer,
    IntentCreation,
}

pub fn steps_for(action: Action) -> &'static [BatchStep] {
    use BatchStep::*;
    match action {
        Action::Supply | Action::Repay => &[WrapIn, PoolCall],
        Action::Withdraw => &[PoolCall, UnwrapOut, DestinationTransfer],
        Action::Borrow => &[PoolCall, FeeExtraction, UnwrapOut, DestinationTransfer],
        Action::Swap => &[FeeExtraction, IntentCreation],
    }
}

/// Where delivered funds end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// An account on the hub chain itself.
    Hub { recipient: Address },
    /// An account on a spoke chain, in that chain's address encoding.
    Spoke { chain_id: ChainId, recipient: Bytes },
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub action: Action,
    pub asset: HubAssetInfo,
    /// Amount in `asset` units (the spoke token's decimals).
    pub amount: U256,
    /// Hub wallet executing the batch.
    pub hub_wallet: Address,
    /// Owner of the pool position for supply, borrow and repay.
    pub on_behalf_of: Address,
    /// Required for actions that deliver funds, except swap.
    pub destination: Option<Destination>,
    /// Required for swap; `input_amount` is overwritten with the principal.
    pub intent: Option<SwapIntent>,
}

/// Ordered hub calls plus the amounts they were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBatch {
    pub calls: Vec<ContractCall>,
    /// Partner fee taken, in the units of the fee step's token.
    pub fee: U256,
    /// Amount forwarded after the fee, in the same units as `fee`.
    pub principal: U256,
    pub intent: Option<SwapIntent>,
    /// True when a call bridges funds out of the hub to a spoke chain.
    pub bridges_out: bool,
}

/// Hub contract addresses and fee setting used by every batch.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    pool: PoolEncoder,
    asset_manager: Address,
    wrapped_native: Address,
    intents: Address,
    partner_fee: Option<PartnerFee>,
}

struct Cursor {
    token: Address,
    amount: U256,
}

impl BatchBuilder {
    pub fn new(
        pool: Address,
        asset_manager: Address,
        wrapped_native: Address,
        intents: Address,
        partner_fee: Option<PartnerFee>,
    ) -> Self {
        Self {
            pool: PoolEncoder::new(pool),
            asset_manager,
            wrapped_native,
            intents,
            partner_fee,
        }
    }

    pub fn from_config(config: &ConfigService) -> Self {
        let hub = config.hub_chain();
        Self::new(
            hub.lending_pool,
            hub.asset_manager,
            hub.wrapped_native,
            hub.intents,
            config.partner_fee().copied(),
        )
    }

    pub fn build(&self, request: &BatchRequest) -> Result<CallBatch, IntentError> {
        if request.amount.is_zero() {
            return Err(IntentError::ValidationFailed("amount must be positive".into()));
        }

        let asset = request.asset;
        let mut calls = Vec::new();
        let mut cursor = Cursor {
            token: asset.asset,
            amount: request.amount,
        };
        let mut fee = U256::ZERO;
        let mut principal = request.amount;
        let mut intent = None;
        let mut bridges_out = false;

        for step in steps_for(request.action) {
            match step {
                BatchStep::WrapIn => {
                    if !asset.is_vault_denominated() {
                        calls.push(erc20::approve(asset.asset, asset.vault, cursor.amount));
                        calls.push(vault_token::deposit(asset.vault, asset.asset, cursor.amount));
                        cursor = Cursor {
                            token: asset.vault,
                            amount: translate_incoming(asset.decimals, cursor.amount)?,
                        };
                    }
                }
                BatchStep::PoolCall => {
                    // Borrow and withdraw start from a hub position, so their
                    // amounts still need translating into vault units.
                    if matches!(request.action, Action::Borrow | Action::Withdraw) {
                        cursor = Cursor {
                            token: asset.vault,
                            amount: if asset.is_vault_denominated() {
                                cursor.amount
                            } else {
                                translate_incoming(asset.decimals, cursor.amount)?
                            },
                        };
                    }
                    let account = match request.action {
                        Action::Withdraw => request.hub_wallet,
                        _ => request.on_behalf_of,
                    };
                    if matches!(request.action, Action::Supply | Action::Repay) {
                        calls.push(erc20::approve(cursor.token, self.pool.pool(), cursor.amount));
                    }
                    calls.push(self.pool.encode_action(
                        request.action,
                        cursor.token,
                        cursor.amount,
                        account,
                    )?);
                }
                BatchStep::FeeExtraction => {
                    let split = split_fee(self.partner_fee.as_ref(), cursor.amount)?;
                    if let Some(partner) = self.partner_fee.filter(|_| !split.fee.is_zero()) {
                        calls.push(erc20::transfer(cursor.token, partner.recipient(), split.fee));
                    }
                    fee = split.fee;
                    principal = split.principal;
                    cursor.amount = split.principal;
                }
                BatchStep::UnwrapOut => {
                    if !asset.is_vault_denominated() {
                        calls.push(vault_token::withdraw(asset.vault, asset.asset, cursor.amount));
                        cursor = Cursor {
                            token: asset.asset,
                            amount: translate_outgoing(asset.decimals, cursor.amount)?,
                        };
                    }
                }
                BatchStep::DestinationTransfer => {
                    let destination = request.destination.as_ref().ok_or_else(|| {
                        IntentError::ValidationFailed(format!(
                            "{} requires a destination",
                            request.action
                        ))
                    })?;
                    if cursor.amount.is_zero() {
                        return Err(IntentError::ValidationFailed(
                            "amount rounds to zero on the destination chain".into(),
                        ));
                    }
                    calls.push(self.destination_transfer(destination, &cursor));
                    bridges_out = matches!(destination, Destination::Spoke { .. });
                }
                BatchStep::IntentCreation => {
                    let mut swap = request.intent.clone().ok_or_else(|| {
                        IntentError::ValidationFailed("swap requires an intent".into())
                    })?;
                    swap.input_amount = cursor.amount;
                    calls.push(erc20::approve(cursor.token, self.intents, cursor.amount));
                    calls.push(intents::create_intent(self.intents, swap.to_sol()));
                    intent = Some(swap);
                }
            }
        }

        Ok(CallBatch {
            calls,
            fee,
            principal,
            intent,
            bridges_out,
        })
    }

    fn destination_transfer(&self, destination: &Destination, cursor: &Cursor) -> ContractCall {
        match destination {
            Destination::Hub { recipient } if cursor.token == self.wrapped_native => {
                erc20::withdraw_to(self.wrapped_native, *recipient, cursor.amount)
            }
            Destination::Hub { recipient } => erc20::transfer(cursor.token, *recipient, cursor.amount),
            Destination::Spoke { recipient, .. } => asset_manager::hub_transfer(
                self.asset_manager,
                cursor.token,
                recipient.clone(),
                cursor.amount,
                Bytes::new(),
            ),
        }
    }
}
