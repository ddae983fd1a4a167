use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::contracts::IPool;
use crate::types::{Action, ContractCall};
use crate::error::IntentError;

/// Variable interest rate mode on the lending pool.
pub const VARIABLE_RATE_MODE: u8 = 2;

/// Encodes lending pool calls against a configured pool address.
#[derive(Debug, Clone, Copy)]
pub struct PoolEncoder {
    pool: Address,
}

impl PoolEncoder {
    pub fn new(pool: Address) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    fn call(&self, data: Vec<u8>) -> ContractCall {
        ContractCall {
            address: self.pool,
            value: U256::ZERO,
            data: Bytes::from(data),
        }
    }

    /// Encode `supply(address,uint256,address,uint16)`.
    pub fn supply(&self, asset: Address, amount: U256, on_behalf_of: Address) -> ContractCall {
        self.call(
            IPool::supplyCall {
                asset,
                amount,
                onBehalfOf: on_behalf_of,
                referralCode: 0,
            }
            .abi_encode(),
        )
    }

    /// Encode `withdraw(address,uint256,address)`.
    pub fn withdraw(&self, asset: Address, amount: U256, to: Address) -> ContractCall {
        self.call(IPool::withdrawCall { asset, amount, to }.abi_encode())
    }

    /// Encode `borrow(address,uint256,uint256,uint16,address)`.
    pub fn borrow(&self, asset: Address, amount: U256, on_behalf_of: Address) -> ContractCall {
        self.call(
            IPool::borrowCall {
                asset,
                amount,
                interestRateMode: U256::from(VARIABLE_RATE_MODE),
                referralCode: 0,
                onBehalfOf: on_behalf_of,
            }
            .abi_encode(),
        )
    }

    /// Encode `repay(address,uint256,uint256,address)`.
    pub fn repay(&self, asset: Address, amount: U256, on_behalf_of: Address) -> ContractCall {
        self.call(
            IPool::repayCall {
                asset,
                amount,
                interestRateMode: U256::from(VARIABLE_RATE_MODE),
                onBehalfOf: on_behalf_of,
            }
            .abi_encode(),
        )
    }

    /// Pool call for a money-market action. `account` is the position owner
    /// (supply/borrow/repay) or the receiver of withdrawn funds.
    pub fn encode_action(
        &self,
        action: Action,
        asset: Address,
        amount: U256,
        account: Address,
    ) -> Result<ContractCall, IntentError> {
        match action {
            Action::Supply => Ok(self.supply(asset, amount, account)),
            Action::Withdraw => Ok(self.withdraw(asset, amount, account)),
            Action::Borrow => Ok(self.borrow(asset, amount, account)),
            Action::Repay => Ok(self.repay(asset, amount, account)),
            Action::Swap => Err(IntentError::ValidationFailed(
                "swap has no lending pool call".into(),
            )),
        }
    }
}
