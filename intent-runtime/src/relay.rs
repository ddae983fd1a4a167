use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::{IntentError, RelayError, RelayErrorCode};
use crate::types::{PacketStatus, RelayPacket};

/// HTTP client for the cross-chain relay network.
#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: String,
    client: reqwest::Client,
    request_timeout: Duration,
    poll_interval: Duration,
    default_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    action: &'a str,
    params: RelayParams<'a>,
}

#[derive(Debug, Serialize)]
struct RelayParams<'a> {
    /// Relay chain id of the source chain, as a decimal string.
    chain_id: String,
    tx_hash: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct PacketsResponse {
    success: bool,
    #[serde(default)]
    data: Vec<RelayPacket>,
    #[serde(default)]
    message: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            default_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.endpoint.clone())
            .with_poll_interval(config.poll_interval())
            .with_default_timeout(config.timeout())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        tx_hash: &str,
        src_chain_id: u64,
    ) -> Result<T, IntentError> {
        let request = RelayRequest {
            action,
            params: RelayParams {
                chain_id: src_chain_id.to_string(),
                tx_hash,
            },
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(IntentError::HttpError(format!(
                "relay returned {} for {action}",
                resp.status()
            )));
        }
        Ok(resp.json::<T>().await?)
    }

    /// Hand a source transaction to the relay network.
    pub async fn submit(&self, tx_hash: &str, src_chain_id: u64) -> Result<(), IntentError> {
        let resp: SubmitResponse = self.post("submit", tx_hash, src_chain_id).await?;
        if !resp.success {
            return Err(IntentError::HttpError(format!(
                "relay rejected submission: {}",
                resp.message
            )));
        }
        Ok(())
    }

    pub async fn get_packets(
        &self,
        tx_hash: &str,
        src_chain_id: u64,
    ) -> Result<Vec<RelayPacket>, IntentError> {
        let resp: PacketsResponse = self
            .post("get_transaction_packets", tx_hash, src_chain_id)
            .await?;
        if !resp.success {
            return Err(IntentError::HttpError(format!(
                "relay packet query failed: {}",
                resp.message
            )));
        }
        Ok(resp.data)
    }

    /// Poll until the packet for `tx_hash` reaches a terminal status or
    /// `timeout` elapses. Poll failures are logged and polling continues.
    pub async fn wait_for_packet(
        &self,
        tx_hash: &str,
        src_chain_id: u64,
        timeout: Duration,
    ) -> Result<RelayPacket, RelayError> {
        let poll = async {
            loop {
                match self.get_packets(tx_hash, src_chain_id).await {
                    Ok(packets) => {
                        let packet = packets.into_iter().find(|p| {
                            p.src_tx_hash.eq_ignore_ascii_case(tx_hash) && p.status.is_terminal()
                        });
                        if let Some(packet) = packet {
                            return packet;
                        }
                        debug!(%tx_hash, "packet not yet executed");
                    }
                    Err(e) => warn!(%tx_hash, error = %e, "relay poll failed"),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        let packet = tokio::time::timeout(timeout, poll).await.map_err(|_| {
            RelayError::new(
                RelayErrorCode::RelayTimeout,
                tx_hash,
                format!("no executed packet within {}s", timeout.as_secs_f64()),
            )
        })?;

        match packet.status {
            PacketStatus::Executed if packet.dst_tx_hash.is_empty() => Err(RelayError::new(
                RelayErrorCode::PacketFailed,
                tx_hash,
                format!(
                    "packet to chain {} executed without a destination tx hash",
                    packet.dst_chain_id
                ),
            )),
            PacketStatus::Executed => Ok(packet),
            _ => Err(RelayError::new(
                RelayErrorCode::PacketFailed,
                tx_hash,
                format!("packet to chain {} failed", packet.dst_chain_id),
            )),
        }
    }

    /// Submit `tx_hash` once and wait for its execution packet. Safe to call
    /// again with the same hash after a timeout.
    pub async fn relay_and_await(
        &self,
        tx_hash: &str,
        src_chain_id: u64,
        timeout: Duration,
    ) -> Result<RelayPacket, RelayError> {
        self.submit(tx_hash, src_chain_id)
            .await
            .map_err(|e| RelayError::new(RelayErrorCode::SubmitTxFailed, tx_hash, e.to_string()))?;
        info!(%tx_hash, src_chain_id, "submitted to relay");

        let packet = self.wait_for_packet(tx_hash, src_chain_id, timeout).await?;
        info!(%tx_hash, dst_tx_hash = %packet.dst_tx_hash, "relay packet executed");
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TX: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const DST_TX: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

    fn client(server: &MockServer) -> RelayClient {
        RelayClient::new(server.uri()).with_poll_interval(Duration::from_millis(20))
    }

    async fn mount_submit(server: &MockServer, success: bool) {
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "action": "submit",
                "params": { "chain_id": "23", "tx_hash": TX }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": success,
                "message": (if success { "ok" } else { "unknown tx" })
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_packets(server: &MockServer, status: &str) {
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "action": "get_transaction_packets"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": [{
                    "src_chain_id": 23,
                    "src_tx_hash": TX,
                    "dst_chain_id": 146,
                    "dst_tx_hash": DST_TX,
                    "status": status,
                    "signatures": ["0xsig"]
                }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_relay_and_await_executed() {
        let server = MockServer::start().await;
        mount_submit(&server, true).await;
        mount_packets(&server, "executed").await;

        let packet = client(&server)
            .relay_and_await(TX, 23, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(packet.dst_tx_hash, DST_TX);
        assert_eq!(packet.status, PacketStatus::Executed);
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let server = MockServer::start().await;
        mount_submit(&server, false).await;

        let err = client(&server)
            .relay_and_await(TX, 23, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, RelayErrorCode::SubmitTxFailed);
        assert_eq!(err.payload, TX);
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_submit_failure() {
        let client = RelayClient::new("http://localhost:1")
            .with_request_timeout(Duration::from_millis(100));
        let err = client
            .relay_and_await(TX, 23, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, RelayErrorCode::SubmitTxFailed);
    }

    #[tokio::test]
    async fn test_pending_packet_times_out() {
        let server = MockServer::start().await;
        mount_submit(&server, true).await;
        mount_packets(&server, "executing").await;

        let err = client(&server)
            .relay_and_await(TX, 23, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert_eq!(err.code, RelayErrorCode::RelayTimeout);
        assert_eq!(err.payload, TX);
    }

    #[tokio::test]
    async fn test_failed_packet() {
        let server = MockServer::start().await;
        mount_submit(&server, true).await;
        mount_packets(&server, "failed").await;

        let err = client(&server)
            .relay_and_await(TX, 23, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.code, RelayErrorCode::PacketFailed);
    }

    #[tokio::test]
    async fn test_executed_packet_without_dst_hash_fails() {
        let server = MockServer::start().await;
        mount_submit(&server, true).await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "action": "get_transaction_packets"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": [{
                    "src_chain_id": 23,
                    "src_tx_hash": TX,
                    "dst_chain_id": 146,
                    "status": "executed"
                }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .relay_and_await(TX, 23, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert_eq!(err.code, RelayErrorCode::PacketFailed);
        assert_eq!(err.payload, TX);
    }

    #[tokio::test]
    async fn test_poll_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "action": "get_transaction_packets"
            })))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        mount_packets(&server, "executed").await;

        let packet = client(&server)
            .wait_for_packet(TX, 23, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(packet.status, PacketStatus::Executed);
    }

    #[test]
    fn test_from_config() {
        let config = RelayConfig {
            endpoint: "http://relay.test".into(),
            timeout_secs: 15,
            poll_interval_ms: 250,
        };
        let client = RelayClient::from_config(&config);
        assert_eq!(client.default_timeout(), Duration::from_secs(15));
        assert_eq!(client.poll_interval, Duration::from_millis(250));
    }
}
