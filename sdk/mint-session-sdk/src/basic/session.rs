use crate::advanced::classify::RejectionClassifier;
use crate::basic::auth::{self, MintBackend};
use crate::basic::gating::GatewayVerifier;
use crate::basic::view::{MintButtonState, SessionView};
use crate::core::config::SessionConfig;
use crate::core::connection::LedgerConnection;
use crate::core::constants::{
    CANDY_MACHINE_PROGRAM_ID, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TX_TIMEOUT_MS,
};
use crate::core::signer::MintSigner;
use crate::error::{Result, SessionError};
use crate::types::{HandshakeState, ProgramState, Quota, SessionState};
use crate::utils;
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Parameters of a mint session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Mint program (candy machine) account
    pub candy_machine: Pubkey,
    /// Program that owns `candy_machine`
    pub program_id: Pubkey,
    pub tx_timeout: Duration,
    pub poll_interval: Duration,
    pub commitment: CommitmentLevel,
    pub classifier: RejectionClassifier,
}

impl SessionOptions {
    pub fn new(candy_machine: Pubkey) -> Self {
        Self {
            candy_machine,
            program_id: CANDY_MACHINE_PROGRAM_ID,
            tx_timeout: Duration::from_millis(DEFAULT_TX_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            commitment: CommitmentLevel::Confirmed,
            classifier: RejectionClassifier::default(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Ok(Self {
            candy_machine: config.candy_machine_id()?,
            program_id: CANDY_MACHINE_PROGRAM_ID,
            tx_timeout: config.tx_timeout(),
            poll_interval: config.poll_interval(),
            commitment: config.commitment.into(),
            classifier: RejectionClassifier::new(config.rejection_codes()),
        })
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_tx_timeout(mut self, timeout: Duration) -> Self {
        self.tx_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Owns the session state of one front end and drives every mutation of it.
///
/// Presentation code reads `snapshot()` and sends intents; it never mutates
/// state directly. The state lock is never held across an await.
pub struct MintSession<C, B> {
    pub(crate) connection: C,
    pub(crate) backend: B,
    pub(crate) signer: Option<Arc<dyn MintSigner>>,
    pub(crate) gateway: Option<Arc<dyn GatewayVerifier>>,
    pub(crate) options: SessionOptions,
    pub(crate) clock: fn() -> i64,
    state: Mutex<SessionState>,
    /// Ticket handed to each refresh in start order
    refresh_seq: AtomicU64,
    /// Ticket of the refresh whose program snapshot is stored
    program_seq: AtomicU64,
}

impl<C: LedgerConnection, B: MintBackend> MintSession<C, B> {
    pub fn new(connection: C, backend: B, options: SessionOptions) -> Self {
        Self {
            connection,
            backend,
            signer: None,
            gateway: None,
            options,
            clock: utils::unix_now,
            state: Mutex::new(SessionState::default()),
            refresh_seq: AtomicU64::new(0),
            program_seq: AtomicU64::new(0),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn GatewayVerifier>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Replace the unix-seconds clock used for go-live checks.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh session for `signer`'s wallet.
    pub fn connect_wallet(&mut self, signer: Arc<dyn MintSigner>) {
        let wallet = signer.pubkey();
        tracing::info!(%wallet, "wallet connected");
        self.signer = Some(signer);
        *self.lock() = SessionState::for_wallet(wallet);
    }

    /// Drop the session, including the handshake result.
    pub fn disconnect_wallet(&mut self) {
        if let Some(signer) = self.signer.take() {
            tracing::info!(wallet = %signer.pubkey(), "wallet disconnected");
        }
        *self.lock() = SessionState::default();
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn view(&self) -> SessionView {
        SessionView::of(&self.lock())
    }

    pub fn button_state(&self) -> MintButtonState {
        MintButtonState::of(&self.lock(), (self.clock)())
    }

    pub fn available_units(&self) -> u64 {
        self.lock().available_units()
    }

    /// Synchronize with the ledger and backend.
    ///
    /// Runs the authorization handshake the first time it is called for a
    /// wallet, reads the mint program account, and re-reads the backend quota
    /// once authorized. A failed program read keeps the previous snapshot, and
    /// a snapshot older than the stored one is discarded, so overlapping
    /// refreshes never roll the program state back.
    ///
    /// # Returns
    /// Nothing; failures are logged and leave the affected state untouched.
    /// The purchase counter is re-clamped against the new availability.
    pub async fn refresh(&self) {
        let ticket = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let (wallet, start_handshake, quota_auth) = {
            let mut state = self.lock();
            let Some(wallet) = state.wallet else {
                return;
            };
            let start = state.handshake == HandshakeState::NotStarted;
            if start {
                state.handshake = HandshakeState::InFlight;
            }
            let quota_auth = match (&state.auth_token, state.allow_listed) {
                (Some(token), true) if !start => Some(token.clone()),
                _ => None,
            };
            (wallet, start, quota_auth)
        };
        let wallet_id = wallet.to_string();

        let now = (self.clock)();
        let program =
            utils::fetch_program_state(&self.connection, &self.options.candy_machine, now).await;

        if start_handshake {
            let result = auth::run_handshake(&self.backend, &wallet_id).await;
            let mut state = self.lock();
            state.handshake = if result.token.is_some() {
                HandshakeState::Authorized
            } else {
                HandshakeState::Rejected
            };
            state.auth_token = result.token;
            state.allow_listed = result.allow_listed;
            state.backend_quota = result.quota;
            state.resync_counter();
        } else if let Some(token) = quota_auth {
            match self.backend.fetch_quota(&token, &wallet_id).await {
                Ok(quota) => self.set_quota(quota),
                Err(err) => tracing::warn!(wallet = %wallet, "quota refresh failed: {err}"),
            }
        }

        match program {
            Ok(program) => self.store_program(ticket, program),
            Err(err) => {
                tracing::warn!(candy_machine = %self.options.candy_machine, "program state read failed: {err}");
            },
        }
    }

    fn store_program(&self, ticket: u64, program: ProgramState) {
        let mut state = self.lock();
        if ticket < self.program_seq.load(Ordering::SeqCst) {
            tracing::debug!(ticket, "discarding program snapshot from an older refresh");
            return;
        }
        self.program_seq.store(ticket, Ordering::SeqCst);
        tracing::debug!(
            remaining = program.remaining,
            active = program.is_active,
            "mint program state refreshed"
        );
        state.program_state = Some(program);
        state.resync_counter();
    }

    /// Check that the connected wallet may purchase right now.
    ///
    /// # Returns
    /// `Ok(())` when a wallet is connected, authorized, allow-listed and the
    /// mint program is loaded. Otherwise `Auth`, `AllowList` or `LedgerRead`
    /// naming the first missing precondition.
    pub fn ensure_ready(&self) -> Result<()> {
        let state = self.lock();
        let Some(wallet) = state.wallet else {
            return Err(SessionError::Auth("no wallet connected".to_string()));
        };
        if self.signer.is_none() {
            return Err(SessionError::Auth("no wallet connected".to_string()));
        }
        if !state.is_authorized() {
            return Err(SessionError::Auth(format!("wallet {wallet} is not authorized")));
        }
        if !state.allow_listed {
            return Err(SessionError::AllowList(wallet.to_string()));
        }
        if state.program_state.is_none() {
            return Err(SessionError::LedgerRead("mint program not loaded".to_string()));
        }
        Ok(())
    }

    pub fn set_counter(&self, requested: Option<i64>) {
        let mut state = self.lock();
        let available = state.available_units();
        state.counter.set(requested, available);
    }

    pub fn set_counter_text(&self, text: &str) {
        let mut state = self.lock();
        let available = state.available_units();
        state.counter.set_from_text(text, available);
    }

    pub fn increment_counter(&self) {
        let mut state = self.lock();
        let available = state.available_units();
        state.counter.increment(available);
    }

    pub fn decrement_counter(&self) {
        let mut state = self.lock();
        let available = state.available_units();
        state.counter.decrement(available);
    }

    pub fn dismiss_alert(&self) {
        self.lock().alert.dismiss();
    }

    pub(crate) fn set_quota(&self, quota: Quota) {
        let mut state = self.lock();
        state.backend_quota = quota;
        state.resync_counter();
    }
}
