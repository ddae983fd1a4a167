use std::fmt;

use thiserror::Error;

use crate::types::Action;

/// Internal error type. Every fallible step inside the runtime returns this;
/// orchestrators convert it into an [`ActionError`] at their outer boundary.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unsupported token {token} on chain {chain}")]
    UnsupportedToken { chain: String, token: String },

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Fee exceeds amount: fee {fee}, amount {amount}")]
    FeeExceedsAmount { fee: String, amount: String },

    #[error("Spoke error on {chain}: {message}")]
    SpokeError { chain: String, message: String },

    #[error("Hub error: {0}")]
    HubError(String),

    #[error("Transaction not verified: {0}")]
    VerificationFailed(String),

    #[error("Unsupported operation: {operation} on {family} chains")]
    UnsupportedOperation { operation: String, family: String },

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Solver error: {0}")]
    SolverError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for IntentError {
    fn from(e: reqwest::Error) -> Self {
        IntentError::HttpError(e.to_string())
    }
}

impl From<serde_json::Error> for IntentError {
    fn from(e: serde_json::Error) -> Self {
        IntentError::SerializationError(e.to_string())
    }
}

impl From<alloy::contract::Error> for IntentError {
    fn from(e: alloy::contract::Error) -> Self {
        IntentError::RpcError(e.to_string())
    }
}

impl From<alloy::transports::TransportError> for IntentError {
    fn from(e: alloy::transports::TransportError) -> Self {
        IntentError::RpcError(e.to_string())
    }
}

/// Terminal, caller-actionable codes produced by the relay client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayErrorCode {
    /// The relay network rejected the submission outright.
    SubmitTxFailed,
    /// No terminal packet was observed before the timeout elapsed.
    RelayTimeout,
    /// The relay reported a terminal failure for the packet.
    PacketFailed,
}

impl RelayErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayErrorCode::SubmitTxFailed => "SUBMIT_TX_FAILED",
            RelayErrorCode::RelayTimeout => "RELAY_TIMEOUT",
            RelayErrorCode::PacketFailed => "PACKET_FAILED",
        }
    }
}

impl fmt::Display for RelayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relay failure. `payload` is the source transaction hash, which stays valid
/// for a caller-driven retry of the relay step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message} (tx {payload})")]
pub struct RelayError {
    pub code: RelayErrorCode,
    pub payload: String,
    pub message: String,
}

impl RelayError {
    pub fn new(code: RelayErrorCode, payload: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            payload: payload.into(),
            message: message.into(),
        }
    }
}

/// Public error taxonomy of the orchestrators. Every variant keeps the
/// original request payload so the caller can retry or report it.
#[derive(Error, Debug)]
pub enum ActionError<P: fmt::Debug> {
    /// Invariant violation or failure before any relay attempt.
    #[error("create {action} intent failed: {cause}")]
    CreateIntentFailed {
        action: Action,
        payload: P,
        #[source]
        cause: IntentError,
    },

    /// Anything else that went wrong during the sequence.
    #[error("{action} failed: {cause}")]
    Unknown {
        action: Action,
        payload: P,
        #[source]
        cause: IntentError,
    },

    /// Relay failure, surfaced with the relay's own code.
    #[error("{action} relay failed: {error}")]
    Relay {
        action: Action,
        payload: P,
        error: RelayError,
    },
}

impl<P: fmt::Debug> ActionError<P> {
    /// Stable error code, e.g. `CREATE_SUPPLY_INTENT_FAILED`,
    /// `BORROW_UNKNOWN_ERROR` or `RELAY_TIMEOUT`.
    pub fn code(&self) -> String {
        match self {
            ActionError::CreateIntentFailed { action, .. } => {
                format!("CREATE_{}_INTENT_FAILED", action.code_name())
            }
            ActionError::Unknown { action, .. } => format!("{}_UNKNOWN_ERROR", action.code_name()),
            ActionError::Relay { error, .. } => error.code.as_str().to_string(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            ActionError::CreateIntentFailed { action, .. }
            | ActionError::Unknown { action, .. }
            | ActionError::Relay { action, .. } => *action,
        }
    }

    pub fn payload(&self) -> &P {
        match self {
            ActionError::CreateIntentFailed { payload, .. }
            | ActionError::Unknown { payload, .. }
            | ActionError::Relay { payload, .. } => payload,
        }
    }

    pub fn relay_error(&self) -> Option<&RelayError> {
        match self {
            ActionError::Relay { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_create_failure(&self) -> bool {
        matches!(self, ActionError::CreateIntentFailed { .. })
    }
}

/// Which stage of an orchestrated call failed; decides the public variant.
#[derive(Debug)]
pub(crate) enum Failure {
    Create(IntentError),
    Relay(RelayError),
    Other(IntentError),
}

impl Failure {
    /// Invariant violations are create failures; anything else (RPC, HTTP,
    /// hub lookups) is unexpected.
    pub(crate) fn classify(error: IntentError) -> Self {
        match error {
            IntentError::ValidationFailed(_)
            | IntentError::UnsupportedToken { .. }
            | IntentError::UnknownChain(_)
            | IntentError::EncodingError(_)
            | IntentError::FeeExceedsAmount { .. }
            | IntentError::VerificationFailed(_) => Failure::Create(error),
            IntentError::SpokeError { .. }
            | IntentError::HubError(_)
            | IntentError::UnsupportedOperation { .. }
            | IntentError::RpcError(_)
            | IntentError::SolverError(_)
            | IntentError::ConfigError(_)
            | IntentError::SerializationError(_)
            | IntentError::HttpError(_)
            | IntentError::Timeout(_) => Failure::Other(error),
        }
    }

    pub(crate) fn into_action_error<P: fmt::Debug>(self, action: Action, payload: P) -> ActionError<P> {
        match self {
            Failure::Create(cause) => ActionError::CreateIntentFailed {
                action,
                payload,
                cause,
            },
            Failure::Relay(error) => ActionError::Relay {
                action,
                payload,
                error,
            },
            Failure::Other(cause) => ActionError::Unknown {
                action,
                payload,
                cause,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_codes() {
        let create: ActionError<()> = Failure::Create(IntentError::ValidationFailed("amount".into()))
            .into_action_error(Action::Supply, ());
        assert_eq!(create.code(), "CREATE_SUPPLY_INTENT_FAILED");
        assert!(create.is_create_failure());

        let unknown: ActionError<()> =
            Failure::Other(IntentError::HttpError("boom".into())).into_action_error(Action::Borrow, ());
        assert_eq!(unknown.code(), "BORROW_UNKNOWN_ERROR");

        let relay: ActionError<()> = Failure::Relay(RelayError::new(
            RelayErrorCode::RelayTimeout,
            "0xabc",
            "no packet",
        ))
        .into_action_error(Action::Withdraw, ());
        assert_eq!(relay.code(), "RELAY_TIMEOUT");
        assert_eq!(relay.relay_error().unwrap().payload, "0xabc");
        assert_eq!(relay.action(), Action::Withdraw);
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            Failure::classify(IntentError::UnknownChain("x".into())),
            Failure::Create(_)
        ));
        assert!(matches!(
            Failure::classify(IntentError::RpcError("down".into())),
            Failure::Other(_)
        ));
    }

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::new(RelayErrorCode::SubmitTxFailed, "0x01", "rejected");
        assert_eq!(err.to_string(), "SUBMIT_TX_FAILED: rejected (tx 0x01)");
    }
}
