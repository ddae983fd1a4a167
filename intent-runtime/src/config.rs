//! Static chain, token and endpoint configuration.
//!
//! Loaded once from JSON, validated, and shared read-only as
//! `Arc<ConfigService>`. The relay and solver endpoints can be overridden
//! from the environment:
//!
//! - `INTENT_RELAY_ENDPOINT`
//! - `INTENT_RELAY_TIMEOUT_SECS`
//! - `INTENT_SOLVER_ENDPOINT`

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::IntentError;
use crate::fees::{FEE_BPS_DENOMINATOR, PartnerFee};
use crate::types::{ChainFamily, ChainId, HubAssetInfo, Token};

pub const ENV_RELAY_ENDPOINT: &str = "INTENT_RELAY_ENDPOINT";
pub const ENV_RELAY_TIMEOUT_SECS: &str = "INTENT_RELAY_TIMEOUT_SECS";
pub const ENV_SOLVER_ENDPOINT: &str = "INTENT_SOLVER_ENDPOINT";

fn default_relay_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Hub chain contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubChainConfig {
    pub chain_id: ChainId,
    /// Numeric id used by the relay network and the wallet factory.
    pub relay_chain_id: u64,
    #[serde(default)]
    pub rpc_url: Option<String>,
    pub asset_manager: Address,
    pub wallet_factory: Address,
    pub lending_pool: Address,
    pub intents: Address,
    pub wrapped_native: Address,
}

/// One spoke token and its hub-side counterparts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    pub hub_asset: Address,
    pub hub_vault: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpokeChainConfig {
    pub chain_id: ChainId,
    pub family: ChainFamily,
    pub relay_chain_id: u64,
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Spoke asset manager, in the family's address format. On the hub this is
    /// the hub asset manager.
    pub asset_manager: String,
    /// Cross-chain messaging contract used for wallet calls.
    #[serde(default)]
    pub connection: String,
    /// Marker address of the chain's native asset.
    pub native_token: String,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub endpoint: String,
    #[serde(default = "default_relay_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub endpoint: String,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    pub hub: HubChainConfig,
    pub spokes: Vec<SpokeChainConfig>,
    #[serde(default)]
    pub partner_fee: Option<PartnerFee>,
    pub relay: RelayConfig,
    #[serde(default)]
    pub solver: Option<SolverConfig>,
}

/// Lowercase 0x-hex addresses; other families are case-sensitive.
fn normalize_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Validated, indexed view over a [`SettlementConfig`].
#[derive(Debug, Clone)]
pub struct ConfigService {
    config: SettlementConfig,
    spokes: HashMap<ChainId, usize>,
    tokens: HashMap<(ChainId, String), (usize, usize)>,
}

impl ConfigService {
    pub fn new(config: SettlementConfig) -> Result<Self, IntentError> {
        let mut spokes = HashMap::new();
        let mut tokens = HashMap::new();
        let mut hub_entries = 0usize;

        for (spoke_idx, spoke) in config.spokes.iter().enumerate() {
            if spokes.insert(spoke.chain_id.clone(), spoke_idx).is_some() {
                return Err(IntentError::ConfigError(format!(
                    "duplicate chain entry {}",
                    spoke.chain_id
                )));
            }
            if spoke.family == ChainFamily::Hub {
                hub_entries += 1;
                if spoke.chain_id != config.hub.chain_id {
                    return Err(IntentError::ConfigError(format!(
                        "chain {} has family hub but the hub chain is {}",
                        spoke.chain_id, config.hub.chain_id
                    )));
                }
            }
            for (token_idx, token) in spoke.tokens.iter().enumerate() {
                if token.address.trim().is_empty() {
                    return Err(IntentError::ConfigError(format!(
                        "empty token address for {} on {}",
                        token.symbol, spoke.chain_id
                    )));
                }
                let key = (spoke.chain_id.clone(), normalize_token(&token.address));
                tokens.insert(key, (spoke_idx, token_idx));
            }
        }

        if hub_entries != 1 {
            return Err(IntentError::ConfigError(format!(
                "expected exactly one chain with family hub, found {hub_entries}"
            )));
        }

        if let Some(PartnerFee::Percentage { percentage, .. }) = &config.partner_fee {
            if u64::from(*percentage) > FEE_BPS_DENOMINATOR {
                return Err(IntentError::ConfigError(format!(
                    "partner fee percentage {percentage} exceeds {FEE_BPS_DENOMINATOR} bps"
                )));
            }
        }

        Ok(Self {
            config,
            spokes,
            tokens,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, IntentError> {
        let config: SettlementConfig = serde_json::from_str(json)?;
        Self::new(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IntentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            IntentError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Apply `INTENT_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, IntentError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, IntentError> {
        if let Some(endpoint) = lookup(ENV_RELAY_ENDPOINT) {
            self.config.relay.endpoint = endpoint;
        }
        if let Some(secs) = lookup(ENV_RELAY_TIMEOUT_SECS) {
            self.config.relay.timeout_secs = secs.parse().map_err(|e| {
                IntentError::ConfigError(format!("Invalid {ENV_RELAY_TIMEOUT_SECS} '{secs}': {e}"))
            })?;
        }
        if let Some(endpoint) = lookup(ENV_SOLVER_ENDPOINT) {
            self.config.solver = Some(SolverConfig { endpoint });
        }
        Ok(self)
    }

    pub fn settlement(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn hub_chain(&self) -> &HubChainConfig {
        &self.config.hub
    }

    pub fn hub_chain_id(&self) -> &ChainId {
        &self.config.hub.chain_id
    }

    pub fn is_hub_chain(&self, chain: &ChainId) -> bool {
        *chain == self.config.hub.chain_id
    }

    pub fn spoke_chain(&self, chain: &ChainId) -> Result<&SpokeChainConfig, IntentError> {
        self.spokes
            .get(chain)
            .map(|idx| &self.config.spokes[*idx])
            .ok_or_else(|| IntentError::UnknownChain(chain.to_string()))
    }

    pub fn spoke_chains(&self) -> &[SpokeChainConfig] {
        &self.config.spokes
    }

    fn token_config(&self, chain: &ChainId, token: &str) -> Option<&TokenConfig> {
        self.tokens
            .get(&(chain.clone(), normalize_token(token)))
            .map(|(spoke_idx, token_idx)| &self.config.spokes[*spoke_idx].tokens[*token_idx])
    }

    pub fn token(&self, chain: &ChainId, token: &str) -> Result<Token, IntentError> {
        let cfg = self
            .token_config(chain, token)
            .ok_or_else(|| IntentError::UnsupportedToken {
                chain: chain.to_string(),
                token: token.to_string(),
            })?;
        Ok(Token {
            symbol: cfg.symbol.clone(),
            address: cfg.address.clone(),
            decimals: cfg.decimals,
            chain_id: chain.clone(),
        })
    }

    pub fn hub_asset_info(&self, chain: &ChainId, token: &str) -> Result<HubAssetInfo, IntentError> {
        let cfg = self
            .token_config(chain, token)
            .ok_or_else(|| IntentError::UnsupportedToken {
                chain: chain.to_string(),
                token: token.to_string(),
            })?;
        Ok(HubAssetInfo {
            asset: cfg.hub_asset,
            vault: cfg.hub_vault,
            decimals: cfg.decimals,
        })
    }

    pub fn is_supported_token(&self, chain: &ChainId, token: &str) -> bool {
        self.token_config(chain, token).is_some()
    }

    pub fn is_valid_vault(&self, address: Address) -> bool {
        self.config
            .spokes
            .iter()
            .flat_map(|s| s.tokens.iter())
            .any(|t| t.hub_vault == address)
    }

    pub fn is_native_token(&self, chain: &ChainId, token: &str) -> bool {
        self.spoke_chain(chain)
            .map(|s| normalize_token(&s.native_token) == normalize_token(token))
            .unwrap_or(false)
    }

    pub fn partner_fee(&self) -> Option<&PartnerFee> {
        self.config.partner_fee.as_ref()
    }

    pub fn relay(&self) -> &RelayConfig {
        &self.config.relay
    }

    pub fn solver(&self) -> Option<&SolverConfig> {
        self.config.solver.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "hub": {
                "chain_id": "sonic",
                "relay_chain_id": 146,
                "asset_manager": "0x0000000000000000000000000000000000000a01",
                "wallet_factory": "0x0000000000000000000000000000000000000a02",
                "lending_pool": "0x0000000000000000000000000000000000000a03",
                "intents": "0x0000000000000000000000000000000000000a04",
                "wrapped_native": "0x0000000000000000000000000000000000000a05"
            },
            "spokes": [
                {
                    "chain_id": "sonic",
                    "family": "hub",
                    "relay_chain_id": 146,
                    "asset_manager": "0x0000000000000000000000000000000000000a01",
                    "native_token": "0x0000000000000000000000000000000000000000",
                    "tokens": [{
                        "symbol": "wS",
                        "address": "0x0000000000000000000000000000000000000A05",
                        "decimals": 18,
                        "hub_asset": "0x0000000000000000000000000000000000000a05",
                        "hub_vault": "0x0000000000000000000000000000000000000b05"
                    }]
                },
                {
                    "chain_id": "0xa4b1.arbitrum",
                    "family": "evm",
                    "relay_chain_id": 23,
                    "asset_manager": "0x0000000000000000000000000000000000000c01",
                    "connection": "0x0000000000000000000000000000000000000c02",
                    "native_token": "0x0000000000000000000000000000000000000000",
                    "tokens": [{
                        "symbol": "USDC",
                        "address": "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
                        "decimals": 6,
                        "hub_asset": "0x0000000000000000000000000000000000000d01",
                        "hub_vault": "0x0000000000000000000000000000000000000b01"
                    }]
                },
                {
                    "chain_id": "stellar",
                    "family": "stellar",
                    "relay_chain_id": 27,
                    "asset_manager": "CASSETMANAGER",
                    "native_token": "CNATIVE",
                    "tokens": [{
                        "symbol": "XLM",
                        "address": "CNATIVE",
                        "decimals": 7,
                        "hub_asset": "0x0000000000000000000000000000000000000d02",
                        "hub_vault": "0x0000000000000000000000000000000000000b02"
                    }]
                }
            ],
            "partner_fee": {
                "type": "percentage",
                "address": "0x0000000000000000000000000000000000000fee",
                "percentage": 100
            },
            "relay": { "endpoint": "http://localhost:9000" }
        })
    }

    fn sample() -> ConfigService {
        ConfigService::from_json(&sample_json().to_string()).unwrap()
    }

    #[test]
    fn test_load_and_lookup() {
        let cfg = sample();
        let arb = ChainId::from("0xa4b1.arbitrum");
        assert!(cfg.is_hub_chain(&ChainId::from("sonic")));
        assert!(!cfg.is_hub_chain(&arb));
        assert_eq!(cfg.spoke_chain(&arb).unwrap().relay_chain_id, 23);
        assert_eq!(cfg.relay().timeout_secs, 60);
        assert_eq!(cfg.relay().poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_token_lookup_is_case_insensitive_for_hex() {
        let cfg = sample();
        let arb = ChainId::from("0xa4b1.arbitrum");
        let info = cfg
            .hub_asset_info(&arb, "0xAF88D065E77C8CC2239327C5EDB3A432268E5831")
            .unwrap();
        assert_eq!(info.decimals, 6);
        assert!(!info.is_vault_denominated());
        assert!(cfg.is_valid_vault(info.vault));
        assert_eq!(
            cfg.token(&arb, "0xaf88d065e77c8cc2239327c5edb3a432268e5831").unwrap().symbol,
            "USDC"
        );
    }

    #[test]
    fn test_unsupported_token_and_unknown_chain() {
        let cfg = sample();
        assert!(!cfg.is_supported_token(&ChainId::from("sonic"), "0xdead"));
        assert!(matches!(
            cfg.hub_asset_info(&ChainId::from("sonic"), "0xdead"),
            Err(IntentError::UnsupportedToken { .. })
        ));
        assert!(matches!(
            cfg.spoke_chain(&ChainId::from("nowhere")),
            Err(IntentError::UnknownChain(_))
        ));
        // non-hex addresses keep their case
        assert!(!cfg.is_supported_token(&ChainId::from("stellar"), "cnative"));
        assert!(cfg.is_native_token(&ChainId::from("stellar"), "CNATIVE"));
    }

    #[test]
    fn test_rejects_missing_hub_entry() {
        let mut json = sample_json();
        json["spokes"][0]["family"] = serde_json::json!("evm");
        let err = ConfigService::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, IntentError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_hub_family_on_wrong_chain() {
        let mut json = sample_json();
        json["hub"]["chain_id"] = serde_json::json!("other");
        assert!(ConfigService::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = sample()
            .apply_overrides(|key| match key {
                ENV_RELAY_ENDPOINT => Some("http://relay.test".into()),
                ENV_RELAY_TIMEOUT_SECS => Some("5".into()),
                ENV_SOLVER_ENDPOINT => Some("http://solver.test".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(cfg.relay().endpoint, "http://relay.test");
        assert_eq!(cfg.relay().timeout(), Duration::from_secs(5));
        assert_eq!(cfg.solver().unwrap().endpoint, "http://solver.test");

        let bad = sample().apply_overrides(|key| {
            (key == ENV_RELAY_TIMEOUT_SECS).then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_json().to_string().as_bytes()).unwrap();
        let cfg = ConfigService::from_path(file.path()).unwrap();
        assert!(cfg.partner_fee().is_some());
        assert!(ConfigService::from_path("/nonexistent/intent.json").is_err());
    }
}
