//! Conversion between a spoke token's decimals and the vault's normalized
//! 18-decimal representation. Division always floors.

use alloy::primitives::U256;

use crate::error::IntentError;

/// Decimal exponent of every hub vault token.
pub const VAULT_DECIMALS: u8 = 18;

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Spoke/hub-asset units → vault units.
pub fn translate_incoming(decimals: u8, amount: U256) -> Result<U256, IntentError> {
    if decimals <= VAULT_DECIMALS {
        amount
            .checked_mul(pow10(VAULT_DECIMALS - decimals))
            .ok_or_else(|| overflow(amount, decimals))
    } else {
        Ok(amount / pow10(decimals - VAULT_DECIMALS))
    }
}

/// Vault units → units of a token with `decimals`.
pub fn translate_outgoing(decimals: u8, amount: U256) -> Result<U256, IntentError> {
    if decimals <= VAULT_DECIMALS {
        Ok(amount / pow10(VAULT_DECIMALS - decimals))
    } else {
        amount
            .checked_mul(pow10(decimals - VAULT_DECIMALS))
            .ok_or_else(|| overflow(amount, decimals))
    }
}

fn overflow(amount: U256, decimals: u8) -> IntentError {
    IntentError::EncodingError(format!(
        "amount {amount} overflows when scaling from {decimals} decimals"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_scales_up_low_decimals() {
        // 1 USDC (6 decimals) → 1e18 vault units
        let vault = translate_incoming(6, U256::from(1_000_000u64)).unwrap();
        assert_eq!(vault, U256::from(10u64).pow(U256::from(18u64)));
    }

    #[test]
    fn test_eighteen_decimals_is_identity() {
        let amount = U256::from(123_456_789u64);
        assert_eq!(translate_incoming(18, amount).unwrap(), amount);
        assert_eq!(translate_outgoing(18, amount).unwrap(), amount);
    }

    #[test]
    fn test_round_trip_lossless() {
        for decimals in [0u8, 6, 8, 9, 18] {
            let amount = U256::from(987_654_321u64);
            let vault = translate_incoming(decimals, amount).unwrap();
            assert_eq!(translate_outgoing(decimals, vault).unwrap(), amount, "decimals {decimals}");
        }
    }

    #[test]
    fn test_high_decimals_truncate_on_incoming() {
        // 24-decimal token: the last 6 digits do not fit in 18 decimals
        let amount = U256::from(1_000_000_999_999u64);
        let vault = translate_incoming(24, amount).unwrap();
        assert_eq!(vault, U256::from(1_000_000u64));
        let back = translate_outgoing(24, vault).unwrap();
        assert_eq!(back, U256::from(1_000_000_000_000u64));
        assert!(back <= amount);
    }

    #[test]
    fn test_outgoing_floors() {
        // just under 2 units of a 6-decimal token
        let out = translate_outgoing(6, U256::from(1_999_999_999_999u64)).unwrap();
        assert_eq!(out, U256::from(1u64));
    }

    #[test]
    fn test_incoming_overflow_is_error() {
        assert!(translate_incoming(0, U256::MAX).is_err());
    }
}
