use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SolverConfig;
use crate::error::IntentError;

/// Client for the solver network's execution endpoint.
#[derive(Debug, Clone)]
pub struct SolverApiClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    /// Hub transaction that created the intent.
    intent_tx_hash: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteResponse {
    pub answer: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SolverApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.endpoint.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tell the solvers an intent now exists on the hub.
    pub async fn post_execution(&self, intent_tx_hash: &str) -> Result<ExecuteResponse, IntentError> {
        let url = format!("{}/execute", self.endpoint.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&ExecuteRequest { intent_tx_hash })
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IntentError::SolverError(format!(
                "solver returned {status} for {intent_tx_hash}"
            )));
        }

        let body: ExecuteResponse = resp.json().await?;
        if body.answer != "OK" {
            return Err(IntentError::SolverError(format!(
                "solver refused {intent_tx_hash}: {}",
                body.message.as_deref().unwrap_or("no message")
            )));
        }
        info!(%intent_tx_hash, task_id = ?body.task_id, "solver accepted intent");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HASH: &str = "0x3333333333333333333333333333333333333333333333333333333333333333";

    #[tokio::test]
    async fn test_post_execution_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_json(serde_json::json!({ "intent_tx_hash": HASH })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "OK",
                "task_id": "task-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = SolverApiClient::new(server.uri())
            .post_execution(HASH)
            .await
            .unwrap();
        assert_eq!(resp.task_id.as_deref(), Some("task-1"));
    }

    #[tokio::test]
    async fn test_post_execution_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "ERR",
                "code": -4,
                "message": "intent not found"
            })))
            .mount(&server)
            .await;

        let err = SolverApiClient::new(server.uri())
            .post_execution(HASH)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("intent not found"));
    }

    #[tokio::test]
    async fn test_post_execution_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = SolverApiClient::new(server.uri())
            .with_timeout(Duration::from_millis(500))
            .post_execution(HASH)
            .await;
        assert!(matches!(result, Err(IntentError::SolverError(_))));
    }
}
