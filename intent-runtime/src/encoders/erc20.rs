use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::contracts::{IERC20, IWrappedNative};
use crate::types::ContractCall;

fn call(address: Address, data: Vec<u8>) -> ContractCall {
    ContractCall {
        address,
        value: U256::ZERO,
        data: Bytes::from(data),
    }
}

pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
    call(token, IERC20::approveCall { spender, amount }.abi_encode())
}

pub fn transfer(token: Address, to: Address, amount: U256) -> ContractCall {
    call(token, IERC20::transferCall { to, amount }.abi_encode())
}

pub fn transfer_from(token: Address, from: Address, to: Address, amount: U256) -> ContractCall {
    call(token, IERC20::transferFromCall { from, to, amount }.abi_encode())
}

/// `deposit()` on the wrapped-native token, carrying `amount` as call value.
pub fn wrap_native(wrapped: Address, amount: U256) -> ContractCall {
    ContractCall {
        address: wrapped,
        value: amount,
        data: Bytes::from(IWrappedNative::depositCall {}.abi_encode()),
    }
}

/// Unwrap and send native currency to `account`.
pub fn withdraw_to(wrapped: Address, account: Address, amount: U256) -> ContractCall {
    call(wrapped, IWrappedNative::withdrawToCall { account, amount }.abi_encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Address = Address::repeat_byte(0x11);
    const OTHER: Address = Address::repeat_byte(0x22);

    #[test]
    fn test_approve_selector_and_args() {
        let c = approve(TOKEN, OTHER, U256::from(5u64));
        assert_eq!(c.address, TOKEN);
        assert_eq!(&c.data[..4], IERC20::approveCall::SELECTOR.as_slice());
        let decoded = IERC20::approveCall::abi_decode(&c.data).unwrap();
        assert_eq!(decoded.spender, OTHER);
        assert_eq!(decoded.amount, U256::from(5u64));
    }

    #[test]
    fn test_wrap_native_carries_value() {
        let c = wrap_native(TOKEN, U256::from(7u64));
        assert_eq!(c.value, U256::from(7u64));
        assert_eq!(c.data.len(), 4);
    }

    #[test]
    fn test_withdraw_to() {
        let c = withdraw_to(TOKEN, OTHER, U256::from(9u64));
        let decoded = IWrappedNative::withdrawToCall::abi_decode(&c.data).unwrap();
        assert_eq!(decoded.account, OTHER);
        assert_eq!(c.value, U256::ZERO);
    }
}
