use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use uuid::Uuid;

use crate::contracts::IIntents;
use crate::error::IntentError;
use crate::types::{Action, ActionParams, ChainId};

/// Builder for money-market [`ActionParams`].
pub struct ActionParamsBuilder {
    action: Option<Action>,
    token: Option<String>,
    amount: Option<U256>,
    to_chain_id: Option<ChainId>,
    to_address: Option<String>,
    from_chain_id: Option<ChainId>,
    from_address: Option<String>,
}

impl ActionParamsBuilder {
    pub fn new() -> Self {
        Self {
            action: None,
            token: None,
            amount: None,
            to_chain_id: None,
            to_address: None,
            from_chain_id: None,
            from_address: None,
        }
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn amount(mut self, amount: U256) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn destination(mut self, chain_id: impl Into<ChainId>, address: impl Into<String>) -> Self {
        self.to_chain_id = Some(chain_id.into());
        self.to_address = Some(address.into());
        self
    }

    /// Borrow on behalf of another chain's account.
    pub fn source(mut self, chain_id: impl Into<ChainId>, address: impl Into<String>) -> Self {
        self.from_chain_id = Some(chain_id.into());
        self.from_address = Some(address.into());
        self
    }

    pub fn build(self) -> Result<ActionParams, IntentError> {
        let action = self
            .action
            .ok_or_else(|| IntentError::ValidationFailed("action required".into()))?;
        if action == Action::Swap {
            return Err(IntentError::ValidationFailed(
                "swap is not a money market action".into(),
            ));
        }
        Ok(ActionParams {
            action,
            token: self
                .token
                .ok_or_else(|| IntentError::ValidationFailed("token required".into()))?,
            amount: self
                .amount
                .ok_or_else(|| IntentError::ValidationFailed("amount required".into()))?,
            to_chain_id: self.to_chain_id,
            to_address: self.to_address,
            from_chain_id: self.from_chain_id,
            from_address: self.from_address,
        })
    }
}

impl Default for ActionParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of a swap. `input_token` lives on the source chain,
/// `output_token` on the destination chain (the source chain by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub input_token: String,
    pub output_token: String,
    pub input_amount: U256,
    pub min_output_amount: U256,
    /// Unix seconds; `0` means no deadline (limit order).
    pub deadline: u64,
    pub allow_partial_fill: bool,
    pub dst_chain_id: Option<ChainId>,
    pub dst_address: Option<String>,
    /// Exclusive solver, or zero for any solver.
    pub solver: Address,
    pub data: Bytes,
}

pub struct SwapParamsBuilder {
    input_token: Option<String>,
    output_token: Option<String>,
    input_amount: Option<U256>,
    min_output_amount: U256,
    deadline_secs: Option<i64>,
    allow_partial_fill: bool,
    dst_chain_id: Option<ChainId>,
    dst_address: Option<String>,
    solver: Address,
    data: Bytes,
}

impl SwapParamsBuilder {
    pub fn new() -> Self {
        Self {
            input_token: None,
            output_token: None,
            input_amount: None,
            min_output_amount: U256::ZERO,
            deadline_secs: None,
            allow_partial_fill: false,
            dst_chain_id: None,
            dst_address: None,
            solver: Address::ZERO,
            data: Bytes::new(),
        }
    }

    pub fn input_token(mut self, token: impl Into<String>) -> Self {
        self.input_token = Some(token.into());
        self
    }

    pub fn output_token(mut self, token: impl Into<String>) -> Self {
        self.output_token = Some(token.into());
        self
    }

    pub fn input_amount(mut self, amount: U256) -> Self {
        self.input_amount = Some(amount);
        self
    }

    pub fn min_output_amount(mut self, amount: U256) -> Self {
        self.min_output_amount = amount;
        self
    }

    /// Deadline relative to now. Non-positive values mean no deadline.
    pub fn deadline_secs(mut self, secs: i64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    pub fn allow_partial_fill(mut self, allow: bool) -> Self {
        self.allow_partial_fill = allow;
        self
    }

    pub fn destination(mut self, chain_id: impl Into<ChainId>, address: impl Into<String>) -> Self {
        self.dst_chain_id = Some(chain_id.into());
        self.dst_address = Some(address.into());
        self
    }

    pub fn solver(mut self, solver: Address) -> Self {
        self.solver = solver;
        self
    }

    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    pub fn build(self) -> Result<SwapParams, IntentError> {
        let deadline_secs = self.deadline_secs.unwrap_or(300);
        let deadline = if deadline_secs > 0 {
            chrono::TimeDelta::try_seconds(deadline_secs)
                .and_then(|delta| Utc::now().checked_add_signed(delta))
                .ok_or_else(|| {
                    IntentError::ValidationFailed(format!(
                        "deadline of {deadline_secs}s is out of range"
                    ))
                })?
                .timestamp()
                .max(0) as u64
        } else {
            0
        };

        Ok(SwapParams {
            input_token: self
                .input_token
                .ok_or_else(|| IntentError::ValidationFailed("input_token required".into()))?,
            output_token: self
                .output_token
                .ok_or_else(|| IntentError::ValidationFailed("output_token required".into()))?,
            input_amount: self
                .input_amount
                .ok_or_else(|| IntentError::ValidationFailed("input_amount required".into()))?,
            min_output_amount: self.min_output_amount,
            deadline,
            allow_partial_fill: self.allow_partial_fill,
            dst_chain_id: self.dst_chain_id,
            dst_address: self.dst_address,
            solver: self.solver,
            data: self.data,
        })
    }
}

impl Default for SwapParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap intent as created on the hub intents contract. Tokens are hub assets,
/// amounts are in hub asset units and the chain ids are relay chain ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
    pub intent_id: U256,
    pub creator: Address,
    pub input_token: Address,
    pub output_token: Address,
    pub input_amount: U256,
    pub min_output_amount: U256,
    pub deadline: u64,
    pub allow_partial_fill: bool,
    pub src_chain: u64,
    pub dst_chain: u64,
    pub src_address: Bytes,
    pub dst_address: Bytes,
    pub solver: Address,
    pub data: Bytes,
}

impl SwapIntent {
    pub fn to_sol(&self) -> IIntents::Intent {
        IIntents::Intent {
            intentId: self.intent_id,
            creator: self.creator,
            inputToken: self.input_token,
            outputToken: self.output_token,
            inputAmount: self.input_amount,
            minOutputAmount: self.min_output_amount,
            deadline: U256::from(self.deadline),
            allowPartialFill: self.allow_partial_fill,
            srcChain: U256::from(self.src_chain),
            dstChain: U256::from(self.dst_chain),
            srcAddress: self.src_address.clone(),
            dstAddress: self.dst_address.clone(),
            solver: self.solver,
            data: self.data.clone(),
        }
    }
}

/// Fresh random intent id: Keccak-256 of a v4 UUID.
pub fn new_intent_id() -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    U256::from_be_slice(&hasher.finalize())
}

/// Keccak-256 of the ABI-encoded intent, 0x-prefixed.
pub fn hash_intent(intent: &SwapIntent) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(intent.to_sol().abi_encode());
    let result = hasher.finalize();
    format!("0x{}", hex::encode(result))
}
