use crate::types::ProgramState;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

/// Status reported by the external gateway (human verification) subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayStatus {
    #[default]
    Unknown,
    Checking,
    NotRequested,
    CollectingUserInformation,
    InReview,
    Active,
    Rejected,
    Revoked,
    Frozen,
    Error,
}

impl GatewayStatus {
    fn is_failure(self) -> bool {
        matches!(
            self,
            GatewayStatus::Rejected
                | GatewayStatus::Revoked
                | GatewayStatus::Frozen
                | GatewayStatus::Error
        )
    }
}

/// External subsystem that issues gateway credentials.
#[async_trait]
pub trait GatewayVerifier: Send + Sync {
    /// Ask the user to start verification. Progress arrives later as
    /// `GatewayStatus` events.
    async fn request_token(&self) -> Result<(), String>;
}

/// Whether purchases need a gateway credential first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatingMode {
    Direct,
    Gated { network: Pubkey },
}

impl GatingMode {
    pub fn for_program(program: Option<&ProgramState>) -> Self {
        match program.and_then(|p| p.gating) {
            Some(gating) => GatingMode::Gated {
                network: gating.network,
            },
            None => GatingMode::Direct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatingState {
    #[default]
    Idle,
    AwaitingUserConsent,
    CollectingInformation,
    Verified,
}

/// What the session should do after feeding the flow an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatingAction {
    PurchaseNow,
    RequestCredential,
    Ignore,
    Fail(String),
}

/// Gated purchase state machine:
/// `Idle -> AwaitingUserConsent -> CollectingInformation -> Verified -> Idle`.
///
/// Gateway events only matter while a request this flow started is pending.
#[derive(Debug, Clone, Default)]
pub struct GatingFlow {
    state: GatingState,
    last_status: GatewayStatus,
}

impl GatingFlow {
    pub fn state(&self) -> GatingState {
        self.state
    }

    pub fn last_status(&self) -> GatewayStatus {
        self.last_status
    }

    pub fn is_verifying(&self) -> bool {
        self.state == GatingState::CollectingInformation
    }

    fn is_pending(&self) -> bool {
        matches!(
            self.state,
            GatingState::AwaitingUserConsent | GatingState::CollectingInformation
        )
    }

    pub fn on_purchase_intent(&mut self, mode: GatingMode) -> GatingAction {
        match mode {
            GatingMode::Direct => GatingAction::PurchaseNow,
            GatingMode::Gated { .. } if self.last_status == GatewayStatus::Active => {
                GatingAction::PurchaseNow
            },
            GatingMode::Gated { .. } if self.state != GatingState::Idle => GatingAction::Ignore,
            GatingMode::Gated { network } => {
                tracing::debug!(%network, "requesting gateway credential");
                self.state = GatingState::AwaitingUserConsent;
                GatingAction::RequestCredential
            },
        }
    }

    pub fn on_status(&mut self, status: GatewayStatus) -> GatingAction {
        self.last_status = status;
        if !self.is_pending() {
            return GatingAction::Ignore;
        }

        match status {
            GatewayStatus::CollectingUserInformation => {
                self.state = GatingState::CollectingInformation;
                GatingAction::Ignore
            },
            GatewayStatus::Active => {
                self.state = GatingState::Verified;
                GatingAction::PurchaseNow
            },
            failed if failed.is_failure() => {
                self.state = GatingState::Idle;
                GatingAction::Fail(format!("gateway reported {failed:?}"))
            },
            _ => GatingAction::Ignore,
        }
    }

    /// The verified credential was spent on a purchase.
    pub fn consume(&mut self) {
        if self.state == GatingState::Verified {
            self.state = GatingState::Idle;
        }
    }

    pub fn request_failed(&mut self) {
        self.state = GatingState::Idle;
    }
}
