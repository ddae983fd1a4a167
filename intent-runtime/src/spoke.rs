//! Per-chain-family capabilities consumed by the orchestrators.
//!
//! The hub and EVM families are implemented in [`crate::evm_spoke`]. Other
//! families plug in their own wallet connector by implementing
//! [`SpokeService`]; the optional capabilities default to
//! [`IntentError::UnsupportedOperation`].

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::config::SpokeChainConfig;
use crate::error::IntentError;
use crate::types::{ChainFamily, ContractCall, GasEstimate, RawTransaction, TxResult};

/// Move `amount` of `token` from `from` into the hub and execute `calls` from
/// the hub wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    pub from: String,
    pub token: String,
    pub amount: U256,
    pub hub_wallet: Address,
    pub calls: Vec<ContractCall>,
}

/// Execute `calls` from the hub wallet without moving funds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletCallRequest {
    pub from: String,
    pub hub_wallet: Address,
    pub calls: Vec<ContractCall>,
}

fn unsupported(chain: &SpokeChainConfig, operation: &str) -> IntentError {
    IntentError::UnsupportedOperation {
        operation: operation.to_string(),
        family: chain.family.to_string(),
    }
}

#[async_trait]
pub trait SpokeService: Send + Sync {
    fn chain(&self) -> &SpokeChainConfig;

    fn family(&self) -> ChainFamily {
        self.chain().family
    }

    /// Address of the signing account, in the family's format.
    async fn wallet_address(&self) -> Result<String, IntentError>;

    async fn deposit(&self, request: &DepositRequest, raw: bool) -> Result<TxResult, IntentError>;

    async fn call_wallet(
        &self,
        request: &WalletCallRequest,
        raw: bool,
    ) -> Result<TxResult, IntentError>;

    /// `Ok(true)` once the transaction is included and succeeded.
    async fn verify_tx_hash(&self, tx_hash: &str) -> Result<bool, IntentError>;

    async fn estimate_gas(&self, tx: &RawTransaction) -> Result<GasEstimate, IntentError>;

    async fn allowance(
        &self,
        _token: &str,
        _owner: &str,
        _spender: &str,
    ) -> Result<U256, IntentError> {
        Err(unsupported(self.chain(), "allowance"))
    }

    /// Send one call from the signing account, e.g. an ERC-20 approval.
    async fn send_call(&self, _call: &ContractCall, _raw: bool) -> Result<TxResult, IntentError> {
        Err(unsupported(self.chain(), "send_call"))
    }

    async fn has_sufficient_trustline(
        &self,
        _token: &str,
        _amount: U256,
        _account: &str,
    ) -> Result<bool, IntentError> {
        Err(unsupported(self.chain(), "has_sufficient_trustline"))
    }

    async fn request_trustline(
        &self,
        _token: &str,
        _amount: U256,
        _raw: bool,
    ) -> Result<TxResult, IntentError> {
        Err(unsupported(self.chain(), "request_trustline"))
    }
}
