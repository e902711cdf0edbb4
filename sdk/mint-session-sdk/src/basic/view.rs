use crate::types::{HandshakeState, SessionState};

/// Top-level screen the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    Connect,
    AwaitingAuthorization,
    /// Backend refused the wallet; not retried until it reconnects
    NotAuthorized,
    AllowListRequired,
    Mint,
}

impl SessionView {
    pub fn of(state: &SessionState) -> Self {
        if state.wallet.is_none() {
            SessionView::Connect
        } else if state.is_allow_listed() {
            SessionView::Mint
        } else if state.is_authorized() {
            SessionView::AllowListRequired
        } else if state.handshake == HandshakeState::Rejected {
            SessionView::NotAuthorized
        } else {
            SessionView::AwaitingAuthorization
        }
    }
}

/// Label state of the purchase button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintButtonState {
    Connecting,
    SoldOut,
    Verifying,
    Minting,
    Ready,
    /// Counting down to the go-live timestamp
    Countdown(i64),
    Unavailable,
}

impl MintButtonState {
    pub fn of(state: &SessionState, now: i64) -> Self {
        let Some(program) = &state.program_state else {
            return MintButtonState::Connecting;
        };
        if program.is_sold_out {
            return MintButtonState::SoldOut;
        }
        if program.is_open_at(now) {
            if state.gating.is_verifying() {
                MintButtonState::Verifying
            } else if state.minting {
                MintButtonState::Minting
            } else {
                MintButtonState::Ready
            }
        } else {
            match program.go_live_at {
                Some(go_live) if go_live >= now => MintButtonState::Countdown(go_live),
                _ => MintButtonState::Unavailable,
            }
        }
    }
}

/// Whether the purchase button accepts clicks.
pub fn is_purchase_disabled(state: &SessionState, now: i64) -> bool {
    let Some(program) = &state.program_state else {
        return true;
    };
    program.is_sold_out
        || state.minting
        || !program.is_open_at(now)
        || state.gating.is_verifying()
        || state.available_units() == 0
}
