//! Hub wallet derivation.
//!
//! Every (chain, account) pair owns a deterministic hub wallet deployed by the
//! wallet factory. Accounts on the hub chain itself act through a per-user
//! router, which is the factory address derived with the hub's own chain id.

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::DynProvider;
use async_trait::async_trait;
use tracing::debug;

use crate::chain::read_only_provider;
use crate::config::{ConfigService, HubChainConfig, SpokeChainConfig};
use crate::contracts::IWalletFactory;
use crate::error::IntentError;
use crate::types::{ChainFamily, parse_address};

#[async_trait]
pub trait HubService: Send + Sync {
    /// Hub wallet of `address` on `chain`. For hub-chain accounts this is the
    /// user's router.
    async fn user_hub_wallet_address(
        &self,
        address: &str,
        chain: &SpokeChainConfig,
    ) -> Result<Address, IntentError>;

    async fn user_router(&self, address: Address) -> Result<Address, IntentError>;
}

/// Reads wallet addresses from the hub wallet factory.
pub struct EvmHubService {
    factory: Address,
    hub_relay_chain_id: u64,
    provider: DynProvider,
}

impl EvmHubService {
    pub fn new(hub: &HubChainConfig, provider: DynProvider) -> Self {
        Self {
            factory: hub.wallet_factory,
            hub_relay_chain_id: hub.relay_chain_id,
            provider,
        }
    }

    pub fn from_config(config: &ConfigService) -> Result<Self, IntentError> {
        let hub = config.hub_chain();
        let rpc_url = hub
            .rpc_url
            .as_deref()
            .ok_or_else(|| IntentError::ConfigError("no rpc_url configured for the hub".into()))?;
        Ok(Self::new(hub, read_only_provider(rpc_url)?))
    }

    async fn deployed_address(&self, relay_chain_id: u64, user: Bytes) -> Result<Address, IntentError> {
        let factory = IWalletFactory::new(self.factory, &self.provider);
        let wallet = factory
            .getDeployedAddress(U256::from(relay_chain_id), user)
            .call()
            .await
            .map_err(|e| IntentError::HubError(format!("wallet lookup failed: {e}")))?;
        Ok(wallet)
    }
}

#[async_trait]
impl HubService for EvmHubService {
    async fn user_hub_wallet_address(
        &self,
        address: &str,
        chain: &SpokeChainConfig,
    ) -> Result<Address, IntentError> {
        if chain.family == ChainFamily::Hub {
            return self.user_router(parse_address(address)?).await;
        }
        let encoded = chain.family.encode_address(address)?;
        let wallet = self.deployed_address(chain.relay_chain_id, encoded).await?;
        debug!(chain = %chain.chain_id, %address, %wallet, "resolved hub wallet");
        Ok(wallet)
    }

    async fn user_router(&self, address: Address) -> Result<Address, IntentError> {
        self.deployed_address(
            self.hub_relay_chain_id,
            Bytes::copy_from_slice(address.as_slice()),
        )
        .await
    }
}
