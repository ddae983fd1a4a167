use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::IntentError;

/// Basis-point denominator: a percentage fee of `100` is 1%.
pub const FEE_BPS_DENOMINATOR: u64 = 10_000;

/// Partner fee taken from the hub-side amount before the principal moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartnerFee {
    /// Fee in basis points of the amount.
    Percentage { address: Address, percentage: u16 },
    /// Flat fee in hub-side units.
    Amount { address: Address, amount: u128 },
}

impl PartnerFee {
    pub fn recipient(&self) -> Address {
        match self {
            PartnerFee::Percentage { address, .. } | PartnerFee::Amount { address, .. } => *address,
        }
    }

    /// Fee owed on `amount`. Percentage fees floor.
    pub fn calculate(&self, amount: U256) -> Result<U256, IntentError> {
        match self {
            PartnerFee::Percentage { percentage, .. } => {
                if u64::from(*percentage) > FEE_BPS_DENOMINATOR {
                    return Err(IntentError::ConfigError(format!(
                        "partner fee percentage {percentage} exceeds {FEE_BPS_DENOMINATOR} bps"
                    )));
                }
                let scaled = amount.checked_mul(U256::from(*percentage)).ok_or_else(|| {
                    IntentError::EncodingError(format!("fee overflow on amount {amount}"))
                })?;
                Ok(scaled / U256::from(FEE_BPS_DENOMINATOR))
            }
            PartnerFee::Amount { amount: flat, .. } => {
                let fee = U256::from(*flat);
                if fee > amount {
                    return Err(IntentError::FeeExceedsAmount {
                        fee: fee.to_string(),
                        amount: amount.to_string(),
                    });
                }
                Ok(fee)
            }
        }
    }
}

/// Split of an amount into the partner fee and the forwarded principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: U256,
    pub principal: U256,
}

/// Apply the configured fee (if any) to `amount`.
pub fn split_fee(fee: Option<&PartnerFee>, amount: U256) -> Result<FeeSplit, IntentError> {
    let fee_amount = match fee {
        Some(fee) => fee.calculate(amount)?,
        None => U256::ZERO,
    };
    let principal = amount
        .checked_sub(fee_amount)
        .ok_or_else(|| IntentError::FeeExceedsAmount {
            fee: fee_amount.to_string(),
            amount: amount.to_string(),
        })?;
    Ok(FeeSplit {
        fee: fee_amount,
        principal,
    })
}
