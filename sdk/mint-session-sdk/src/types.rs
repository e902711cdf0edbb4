use crate::basic::counter::{set_counter, PurchaseCounter};
use crate::basic::gating::GatingFlow;
use crate::error::{LedgerError, SessionError};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;

/// Bearer credential issued by the backend after the verify handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Backend-tracked per-wallet purchase allowance.
///
/// `Unknown` covers both "not fetched yet" and "backend answered non-2xx".
/// The backend contract cannot tell those apart from a real zero, so both
/// count as zero available units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quota {
    #[default]
    Unknown,
    Known(u64),
}

impl Quota {
    pub fn known(&self) -> Option<u64> {
        match self {
            Quota::Known(count) => Some(*count),
            Quota::Unknown => None,
        }
    }
}

/// Gateway (human verification) requirement of a mint program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatingConfig {
    pub network: Pubkey,
    pub expire_on_use: bool,
}

/// How the mint program ends its sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSettings {
    /// Sale closes after this unix timestamp
    Date(i64),
    /// Sale closes after this many units
    Amount(u64),
}

/// Decoded snapshot of the mint program account.
///
/// Replaced wholesale on each refresh, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramState {
    /// Mint program account address
    pub address: Pubkey,

    /// Program authority
    pub authority: Pubkey,

    /// Treasury receiving the purchase price
    pub treasury: Pubkey,

    /// SPL token used for payment, `None` for native SOL
    pub token_mint: Option<Pubkey>,

    /// Price per unit in lamports (or token base units)
    pub price: u64,

    pub total_supply: u64,
    pub redeemed: u64,

    /// `total_supply - redeemed`, authoritative from the ledger
    pub remaining: u64,

    pub is_active: bool,
    pub is_sold_out: bool,

    /// Unix seconds when the sale opens
    pub go_live_at: Option<i64>,

    pub end_settings: Option<EndSettings>,

    pub gating: Option<GatingConfig>,
}

impl ProgramState {
    /// Whether the sale has opened before `now` (unix seconds).
    pub fn is_live_at(&self, now: i64) -> bool {
        match self.go_live_at {
            Some(go_live) => go_live < now,
            None => false,
        }
    }

    /// Open for purchases at `now`: live and not closed by an end date.
    pub fn is_open_at(&self, now: i64) -> bool {
        let ended = matches!(self.end_settings, Some(EndSettings::Date(end)) if now > end);
        self.is_live_at(now) && !ended
    }
}

/// Upper bound for purchase requests.
///
/// `min(remaining, quota)` when both are known, otherwise 0.
pub fn available_units(remaining: Option<u64>, quota: Quota) -> u64 {
    match (remaining, quota.known()) {
        (Some(remaining), Some(quota)) => remaining.min(quota),
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Success,
    Error,
}

/// User-facing alert raised by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertState {
    pub visible: bool,
    pub message: String,
    pub severity: Option<AlertSeverity>,
}

impl AlertState {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            visible: true,
            message: message.into(),
            severity: Some(AlertSeverity::Success),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            visible: true,
            message: message.into(),
            severity: Some(AlertSeverity::Error),
        }
    }

    /// Hide the alert, keeping its last message.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_failure(&self) -> bool {
        self.visible && self.severity == Some(AlertSeverity::Error)
    }
}

/// User-facing category of a ledger rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    SoldOut,
    InsufficientFunds,
    NotYetLive,
    Generic,
}

/// Classified ledger rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,

    /// Program custom error code, when the ledger attached one
    pub code: Option<u32>,

    /// Raw ledger error text
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Backend reports zero remaining units
    QuotaExhausted,
    /// Backend quota could not be read
    QuotaUnavailable,
    /// Ledger rejected the transaction
    Rejected(Rejection),
    /// Transaction could not be built or sent
    Submission(String),
    /// Wallet refused or failed to sign
    Signing(String),
    /// Gateway verification failed
    Verification(String),
}

/// Result of one purchase unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed(Signature),
    Failed(FailureReason),
    TimedOut,
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed(_))
    }

    /// Signature of a confirmed unit, or the error describing why the unit
    /// did not land.
    pub fn into_result(self) -> Result<Signature, SessionError> {
        let reason = match self {
            TransactionOutcome::Confirmed(signature) => return Ok(signature),
            TransactionOutcome::TimedOut => {
                return Err(SessionError::ConfirmationTimeout(
                    "signature not confirmed before the deadline".to_string(),
                ))
            },
            TransactionOutcome::Failed(reason) => reason,
        };
        Err(match reason {
            FailureReason::QuotaExhausted => SessionError::QuotaExhausted,
            FailureReason::QuotaUnavailable => {
                SessionError::Backend("quota unavailable".to_string())
            },
            FailureReason::Rejected(rejection) => SessionError::TransactionRejected(rejection.raw),
            FailureReason::Submission(err) => SessionError::Ledger(LedgerError::Rpc(err)),
            FailureReason::Signing(err) => SessionError::Signing(err),
            FailureReason::Verification(err) => SessionError::Auth(err),
        })
    }
}

/// Progress of the one-time authorization handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    #[default]
    NotStarted,
    InFlight,
    /// Backend issued a token
    Authorized,
    /// Backend rejected or was unreachable; not retried this connection
    Rejected,
}

/// In-memory aggregate of one wallet session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub wallet: Option<Pubkey>,
    pub auth_token: Option<AuthToken>,
    pub allow_listed: bool,
    pub backend_quota: Quota,
    pub program_state: Option<ProgramState>,
    pub counter: PurchaseCounter,
    pub alert: AlertState,
    pub handshake: HandshakeState,
    pub gating: GatingFlow,
    pub minting: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        let quota = Quota::default();
        Self {
            wallet: None,
            auth_token: None,
            allow_listed: false,
            backend_quota: quota,
            program_state: None,
            // nothing is available before the first refresh
            counter: set_counter(Some(1), available_units(None, quota)),
            alert: AlertState::default(),
            handshake: HandshakeState::default(),
            gating: GatingFlow::default(),
            minting: false,
        }
    }
}

impl SessionState {
    pub fn for_wallet(wallet: Pubkey) -> Self {
        Self {
            wallet: Some(wallet),
            ..Self::default()
        }
    }

    pub fn wallet_id(&self) -> Option<String> {
        self.wallet.map(|w| w.to_string())
    }

    pub fn is_authorized(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Allow-list membership, trusted only once a token is held.
    pub fn is_allow_listed(&self) -> bool {
        self.is_authorized() && self.allow_listed
    }

    pub fn available_units(&self) -> u64 {
        available_units(
            self.program_state.as_ref().map(|p| p.remaining),
            self.backend_quota,
        )
    }

    /// Bring the counter back within the current availability.
    pub fn resync_counter(&mut self) {
        let available = self.available_units();
        self.counter.resync(available);
    }

    /// Current counter value, `None` while the field is mid-edit.
    pub fn purchase_count(&self) -> Option<u64> {
        self.counter.value()
    }
}
