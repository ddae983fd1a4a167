//! Verify-then-relay tail shared by every orchestrated action.

use std::time::Duration;

use tracing::info;

use crate::error::{Failure, IntentError};
use crate::relay::RelayClient;
use crate::spoke::SpokeService;
use crate::types::{ChainId, SettledIntent, TxResult};

/// Orchestrated calls always submit, so anything else is a bug in the spoke.
pub(crate) fn submitted_hash(tx: TxResult, chain: &ChainId) -> Result<String, Failure> {
    match tx {
        TxResult::Submitted(hash) => Ok(hash),
        TxResult::Raw(_) => Err(Failure::Other(IntentError::SpokeError {
            chain: chain.to_string(),
            message: "expected a submitted transaction, got a raw payload".into(),
        })),
    }
}

/// Verify `tx_hash` on the source chain, then relay it to the hub unless the
/// action already executed there.
pub(crate) async fn settle(
    spoke: &dyn SpokeService,
    relay: &RelayClient,
    tx_hash: String,
    needs_relay: bool,
    timeout: Duration,
) -> Result<SettledIntent, Failure> {
    let chain = &spoke.chain().chain_id;
    match spoke.verify_tx_hash(&tx_hash).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(Failure::Create(IntentError::VerificationFailed(format!(
                "{tx_hash} failed on {chain}"
            ))));
        }
        Err(e) => {
            return Err(Failure::Create(IntentError::VerificationFailed(format!(
                "{tx_hash} on {chain}: {e}"
            ))));
        }
    }

    if !needs_relay {
        info!(%chain, %tx_hash, "executed on hub, no relay needed");
        return Ok(SettledIntent {
            spoke_tx_hash: tx_hash.clone(),
            hub_tx_hash: tx_hash,
        });
    }

    let packet = relay
        .relay_and_await(&tx_hash, spoke.chain().relay_chain_id, timeout)
        .await
        .map_err(Failure::Relay)?;
    Ok(SettledIntent {
        spoke_tx_hash: tx_hash,
        hub_tx_hash: packet.dst_tx_hash,
    })
}
