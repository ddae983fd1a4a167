use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::contracts::IIntents;
use crate::types::ContractCall;

pub fn create_intent(intents: Address, intent: IIntents::Intent) -> ContractCall {
    ContractCall {
        address: intents,
        value: U256::ZERO,
        data: Bytes::from(IIntents::createIntentCall { intent }.abi_encode()),
    }
}

pub fn cancel_intent(intents: Address, intent: IIntents::Intent) -> ContractCall {
    ContractCall {
        address: intents,
        value: U256::ZERO,
        data: Bytes::from(IIntents::cancelIntentCall { intent }.abi_encode()),
    }
}
