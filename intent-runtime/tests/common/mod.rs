//! Shared fixtures: a three-chain config, a recording spoke and a fixed hub.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use intent_runtime::config::{ConfigService, SpokeChainConfig};
use intent_runtime::hub::HubService;
use intent_runtime::relay::RelayClient;
use intent_runtime::spoke::{DepositRequest, SpokeService, WalletCallRequest};
use intent_runtime::{ChainId, ContractCall, GasEstimate, IntentError, RawTransaction, TxResult};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Constants ────────────────────────────────────────────────────────────────

pub const HUB: &str = "sonic";
pub const ARBITRUM: &str = "0xa4b1.arbitrum";

pub const USDC_ARB: &str = "0xaf88d065e77c8cC2239327C5EDb3A432268e5831";
pub const WS_HUB: &str = "0x0000000000000000000000000000000000000a05";

pub const USER: &str = "0x00000000000000000000000000000000000000aa";
pub const SPOKE_TX: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
pub const HUB_TX: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

/// Route runtime logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("intent_runtime=debug")
        .with_test_writer()
        .try_init();
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn pool() -> Address {
    addr("0x0000000000000000000000000000000000000a03")
}

pub fn intents() -> Address {
    addr("0x0000000000000000000000000000000000000a04")
}

pub fn wrapped_native() -> Address {
    addr("0x0000000000000000000000000000000000000a05")
}

pub fn fee_recipient() -> Address {
    addr("0x0000000000000000000000000000000000000fee")
}

// ── Config ───────────────────────────────────────────────────────────────────

pub fn config(relay_endpoint: &str, solver_endpoint: Option<&str>) -> Arc<ConfigService> {
    let mut json = serde_json::json!({
        "hub": {
            "chain_id": HUB,
            "relay_chain_id": 146,
            "asset_manager": "0x0000000000000000000000000000000000000a01",
            "wallet_factory": "0x0000000000000000000000000000000000000a02",
            "lending_pool": "0x0000000000000000000000000000000000000a03",
            "intents": "0x0000000000000000000000000000000000000a04",
            "wrapped_native": "0x0000000000000000000000000000000000000a05"
        },
        "spokes": [
            {
                "chain_id": HUB,
                "family": "hub",
                "relay_chain_id": 146,
                "asset_manager": "0x0000000000000000000000000000000000000a01",
                "native_token": "0x0000000000000000000000000000000000000000",
                "tokens": [{
                    "symbol": "wS",
                    "address": WS_HUB,
                    "decimals": 18,
                    "hub_asset": "0x0000000000000000000000000000000000000a05",
                    "hub_vault": "0x0000000000000000000000000000000000000b05"
                }]
            },
            {
                "chain_id": ARBITRUM,
                "family": "evm",
                "relay_chain_id": 23,
                "asset_manager": "0x0000000000000000000000000000000000000c01",
                "connection": "0x0000000000000000000000000000000000000c02",
                "native_token": "0x0000000000000000000000000000000000000000",
                "tokens": [{
                    "symbol": "USDC",
                    "address": USDC_ARB,
                    "decimals": 6,
                    "hub_asset": "0x0000000000000000000000000000000000000d01",
                    "hub_vault": "0x0000000000000000000000000000000000000b01"
                }]
            }
        ],
        "partner_fee": {
            "type": "percentage",
            "address": "0x0000000000000000000000000000000000000fee",
            "percentage": 100
        },
        "relay": { "endpoint": relay_endpoint, "poll_interval_ms": 20 }
    });
    if let Some(endpoint) = solver_endpoint {
        json["solver"] = serde_json::json!({ "endpoint": endpoint });
    }
    Arc::new(ConfigService::from_json(&json.to_string()).unwrap())
}

pub fn relay(server: &MockServer) -> RelayClient {
    RelayClient::new(server.uri())
        .with_poll_interval(Duration::from_millis(20))
        .with_request_timeout(Duration::from_secs(2))
}

// ── Relay mocks ──────────────────────────────────────────────────────────────

pub async fn mount_relay(server: &MockServer, src_chain_id: u64, status: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": "submit",
            "params": { "chain_id": src_chain_id.to_string(), "tx_hash": SPOKE_TX }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "ok"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": "get_transaction_packets"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [{
                "src_chain_id": src_chain_id,
                "src_tx_hash": SPOKE_TX,
                "dst_chain_id": 146,
                "dst_tx_hash": HUB_TX,
                "status": status,
                "signatures": []
            }]
        })))
        .mount(server)
        .await;
}

/// Relay that must not be contacted at all.
pub async fn mount_silent_relay(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// ── Spoke ────────────────────────────────────────────────────────────────────

/// Spoke that records requests instead of sending transactions.
pub struct MockSpoke {
    chain: SpokeChainConfig,
    wallet: String,
    verifies: bool,
    pub deposits: Mutex<Vec<DepositRequest>>,
    pub wallet_calls: Mutex<Vec<WalletCallRequest>>,
}

impl MockSpoke {
    pub fn new(config: &ConfigService, chain: &str) -> Self {
        Self {
            chain: config.spoke_chain(&ChainId::from(chain)).unwrap().clone(),
            wallet: USER.to_string(),
            verifies: true,
            deposits: Mutex::new(Vec::new()),
            wallet_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_verification(mut self) -> Self {
        self.verifies = false;
        self
    }

    pub fn deposited_calls(&self) -> Vec<ContractCall> {
        self.deposits
            .lock()
            .unwrap()
            .last()
            .map(|d| d.calls.clone())
            .unwrap_or_default()
    }

    pub fn wallet_call_calls(&self) -> Vec<ContractCall> {
        self.wallet_calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.calls.clone())
            .unwrap_or_default()
    }

    fn result(&self, to: &str, raw: bool) -> TxResult {
        if raw {
            TxResult::Raw(RawTransaction {
                from: self.wallet.clone(),
                to: to.to_string(),
                value: U256::ZERO,
                data: Default::default(),
            })
        } else {
            TxResult::Submitted(SPOKE_TX.to_string())
        }
    }
}

#[async_trait]
impl SpokeService for MockSpoke {
    fn chain(&self) -> &SpokeChainConfig {
        &self.chain
    }

    async fn wallet_address(&self) -> Result<String, IntentError> {
        Ok(self.wallet.clone())
    }

    async fn deposit(&self, request: &DepositRequest, raw: bool) -> Result<TxResult, IntentError> {
        self.deposits.lock().unwrap().push(request.clone());
        Ok(self.result(&self.chain.asset_manager, raw))
    }

    async fn call_wallet(
        &self,
        request: &WalletCallRequest,
        raw: bool,
    ) -> Result<TxResult, IntentError> {
        self.wallet_calls.lock().unwrap().push(request.clone());
        Ok(self.result(&self.chain.connection, raw))
    }

    async fn verify_tx_hash(&self, _tx_hash: &str) -> Result<bool, IntentError> {
        Ok(self.verifies)
    }

    async fn estimate_gas(&self, _tx: &RawTransaction) -> Result<GasEstimate, IntentError> {
        Ok(GasEstimate { gas_limit: 150_000 })
    }
}

// ── Hub ──────────────────────────────────────────────────────────────────────

/// Hub wallets keyed by relay chain id, so source and destination differ.
pub struct MockHub;

impl MockHub {
    pub fn wallet_for(relay_chain_id: u64) -> Address {
        Address::repeat_byte(relay_chain_id as u8)
    }

    pub fn arc() -> Arc<dyn HubService> {
        Arc::new(MockHub)
    }
}

#[async_trait]
impl HubService for MockHub {
    async fn user_hub_wallet_address(
        &self,
        _address: &str,
        chain: &SpokeChainConfig,
    ) -> Result<Address, IntentError> {
        Ok(Self::wallet_for(chain.relay_chain_id))
    }

    async fn user_router(&self, _address: Address) -> Result<Address, IntentError> {
        Ok(Self::wallet_for(146))
    }
}
