//! Chain client for the hub and EVM spoke chains.
//!
//! Provides a configured provider with a local signer (private key) for
//! submitting transactions, and read-only providers for lookups such as
//! hub wallet derivation.

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::Address;
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy::providers::{DynProvider, Identity, Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;

use crate::error::IntentError;

/// The concrete provider type produced by `ProviderBuilder::new().wallet(...).connect_http(...)`.
///
/// Fills nonce, gas and chain ID, and signs transactions with the supplied
/// wallet.
pub type HttpProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
    Ethereum,
>;

fn parse_rpc_url(rpc_url: &str) -> Result<url::Url, IntentError> {
    rpc_url
        .parse()
        .map_err(|e| IntentError::ConfigError(format!("Invalid RPC URL: {e}")))
}

/// A chain client wrapping an alloy provider with a local signer.
pub struct ChainClient {
    pub provider: HttpProvider,
    pub address: Address,
}

impl ChainClient {
    /// Create a new chain client from an RPC URL and hex-encoded private key.
    ///
    /// The private key should be a hex string (with or without "0x" prefix).
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self, IntentError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| IntentError::ConfigError(format!("Invalid private key: {e}")))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let url = parse_rpc_url(rpc_url)?;

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url);

        Ok(Self { provider, address })
    }

    /// Type-erased signing provider, as held by the spoke services.
    pub fn into_dyn(self) -> DynProvider {
        self.provider.erased()
    }
}

/// Provider without a signer, for view calls.
pub fn read_only_provider(rpc_url: &str) -> Result<DynProvider, IntentError> {
    let url = parse_rpc_url(rpc_url)?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}
