use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::contracts::IVaultToken;
use crate::types::ContractCall;

/// Deposit `amount` of `token` into the vault, minting vault units.
pub fn deposit(vault: Address, token: Address, amount: U256) -> ContractCall {
    ContractCall {
        address: vault,
        value: U256::ZERO,
        data: Bytes::from(IVaultToken::depositCall { token, amount }.abi_encode()),
    }
}

/// Burn vault units and release `amount` of `token`.
pub fn withdraw(vault: Address, token: Address, amount: U256) -> ContractCall {
    ContractCall {
        address: vault,
        value: U256::ZERO,
        data: Bytes::from(IVaultToken::withdrawCall { token, amount }.abi_encode()),
    }
}
