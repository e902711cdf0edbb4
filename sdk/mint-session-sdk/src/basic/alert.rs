use crate::error::SessionError;
use crate::types::{AlertState, FailureReason, RejectionKind, TransactionOutcome};

pub const MINT_SUCCEEDED: &str = "Congratulations! Mint succeeded!";
pub const SOLD_OUT: &str = "SOLD OUT!";
pub const INSUFFICIENT_FUNDS: &str = "Insufficient funds to mint. Please fund your wallet.";
pub const NOT_YET_LIVE: &str = "Minting period hasn't started yet.";
pub const TIMED_OUT: &str = "Transaction Timeout! Please try again.";
pub const MINT_FAILED: &str = "Mint failed! Please try again!";
pub const QUOTA_EXHAUSTED: &str = "No mints remaining for this wallet.";
pub const QUOTA_UNAVAILABLE: &str = "Could not check remaining mints. Please try again.";
pub const NOT_RECORDED: &str = "Mint confirmed but could not be recorded. Please refresh.";
pub const VERIFICATION_FAILED: &str = "Verification failed! Please try again.";
pub const NOT_CONNECTED: &str = "Connect a wallet to mint.";
pub const NOT_LOADED: &str = "Mint is still connecting. Please try again.";
pub const NOT_AUTHORIZED: &str = "This wallet is not authorized to mint.";

pub fn failure_message(reason: &FailureReason) -> String {
    match reason {
        FailureReason::QuotaExhausted => QUOTA_EXHAUSTED.to_string(),
        FailureReason::QuotaUnavailable => QUOTA_UNAVAILABLE.to_string(),
        FailureReason::Rejected(rejection) => match rejection.kind {
            RejectionKind::SoldOut => SOLD_OUT.to_string(),
            RejectionKind::InsufficientFunds => INSUFFICIENT_FUNDS.to_string(),
            RejectionKind::NotYetLive => NOT_YET_LIVE.to_string(),
            RejectionKind::Generic => format!("{MINT_FAILED} ({})", rejection.raw),
        },
        FailureReason::Submission(_) | FailureReason::Signing(_) => MINT_FAILED.to_string(),
        FailureReason::Verification(_) => VERIFICATION_FAILED.to_string(),
    }
}

/// Alert text for a purchase that failed its readiness check.
pub fn precondition_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::LedgerRead(_) => NOT_LOADED,
        SessionError::Auth(_) | SessionError::AllowList(_) => NOT_AUTHORIZED,
        _ => MINT_FAILED,
    }
}

/// Alert shown for one purchase unit. A timeout tells the user to retry;
/// the transaction's fate is unknown, so it is never reported as sold out.
pub fn alert_for_outcome(outcome: &TransactionOutcome) -> AlertState {
    match outcome {
        TransactionOutcome::Confirmed(_) => AlertState::success(MINT_SUCCEEDED),
        TransactionOutcome::TimedOut => AlertState::failure(TIMED_OUT),
        TransactionOutcome::Failed(reason) => AlertState::failure(failure_message(reason)),
    }
}
