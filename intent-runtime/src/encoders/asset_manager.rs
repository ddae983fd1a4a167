//! Asset manager, connection and router calldata, plus the wire encoding of a
//! call batch.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

use crate::contracts::{
    ContractCallData, IConnection, IHubAssetManager, ISpokeAssetManager, IUserRouter,
};
use crate::types::ContractCall;

impl From<&ContractCall> for ContractCallData {
    fn from(call: &ContractCall) -> Self {
        ContractCallData {
            addr: call.address,
            value: call.value,
            data: call.data.clone(),
        }
    }
}

impl From<ContractCallData> for ContractCall {
    fn from(call: ContractCallData) -> Self {
        ContractCall {
            address: call.addr,
            value: call.value,
            data: call.data,
        }
    }
}

/// ABI-encode a batch as `(address,uint256,bytes)[]`.
pub fn encode_contract_calls(calls: &[ContractCall]) -> Bytes {
    let wire: Vec<ContractCallData> = calls.iter().map(ContractCallData::from).collect();
    Bytes::from(wire.abi_encode())
}

/// Inverse of [`encode_contract_calls`], used to inspect submitted batches.
#[cfg(test)]
pub(crate) fn decode_contract_calls(
    data: &[u8],
) -> Result<Vec<ContractCall>, crate::error::IntentError> {
    let wire = Vec::<ContractCallData>::abi_decode(data)
        .map_err(|e| crate::error::IntentError::EncodingError(format!("Invalid call batch: {e}")))?;
    Ok(wire.into_iter().map(ContractCall::from).collect())
}

/// Hub asset manager transfer: bridge `amount` of hub `token` out to `to` on
/// the spoke the token belongs to.
pub fn hub_transfer(
    asset_manager: Address,
    token: Address,
    to: Bytes,
    amount: U256,
    data: Bytes,
) -> ContractCall {
    let call = IHubAssetManager::transferCall {
        token,
        to,
        amount,
        data,
    };
    ContractCall {
        address: asset_manager,
        value: U256::ZERO,
        data: Bytes::from(call.abi_encode()),
    }
}

/// Calldata for a spoke deposit: lock `amount` of `token` and forward the
/// encoded batch to the hub wallet `to`.
pub fn spoke_transfer(token: Address, to: Bytes, amount: U256, data: Bytes) -> Bytes {
    let call = ISpokeAssetManager::transferCall {
        token,
        to,
        amount,
        data,
    };
    Bytes::from(call.abi_encode())
}

/// Calldata for a wallet call sent through the spoke connection contract.
pub fn send_message(dst_chain_id: u64, dst_address: Bytes, payload: Bytes) -> Bytes {
    let call = IConnection::sendMessageCall {
        dstChainId: U256::from(dst_chain_id),
        dstAddress: dst_address,
        payload,
    };
    Bytes::from(call.abi_encode())
}

/// Calldata for a hub user router executing `calls` in order.
pub fn route(calls: &[ContractCall]) -> Bytes {
    let call = IUserRouter::routeCall {
        calls: calls.iter().map(ContractCallData::from).collect(),
    };
    Bytes::from(call.abi_encode())
}
