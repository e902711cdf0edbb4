use crate::advanced::classify::RejectionClassifier;
use crate::core::connection::LedgerConnection;
use crate::types::{FailureReason, TransactionOutcome};
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::signature::Signature;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll the status of `signature` until it reaches `commitment`, carries a
/// ledger error, or `timeout` elapses.
///
/// RPC failures while polling are logged and retried on the next tick; only
/// the deadline ends the wait.
pub async fn await_confirmation(
    connection: &impl LedgerConnection,
    classifier: &RejectionClassifier,
    signature: &Signature,
    timeout: Duration,
    commitment: CommitmentLevel,
    interval: Duration,
) -> TransactionOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        match connection.get_signature_status(signature).await {
            Ok(Some(status)) => {
                if let Some(err) = status.err {
                    tracing::warn!(%signature, "transaction failed on ledger: {err}");
                    return TransactionOutcome::Failed(FailureReason::Rejected(
                        classifier.classify(&err),
                    ));
                }
                if status.satisfies(commitment) {
                    tracing::debug!(%signature, ?commitment, "transaction confirmed");
                    return TransactionOutcome::Confirmed(*signature);
                }
                tracing::trace!(%signature, confirmations = ?status.confirmations, "awaiting commitment");
            },
            Ok(None) => tracing::trace!(%signature, "signature not yet visible"),
            Err(err) => tracing::warn!(%signature, "signature status poll failed: {err}"),
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(%signature, ?timeout, "confirmation timed out");
            return TransactionOutcome::TimedOut;
        }
        sleep(interval.min(deadline - now)).await;
    }
}
