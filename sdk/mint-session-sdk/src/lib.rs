pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod logging;
pub mod state;
pub mod types;
pub mod utils;

pub use crate::advanced::classify::RejectionClassifier;
pub use crate::basic::auth::{HttpBackend, MintBackend};
pub use crate::basic::counter::{set_counter, PurchaseCounter};
pub use crate::basic::gating::{GatewayStatus, GatewayVerifier, GatingState};
pub use crate::basic::session::{MintSession, SessionOptions};
pub use crate::basic::view::{MintButtonState, SessionView};
pub use crate::core::config::SessionConfig;
pub use crate::core::connection::LedgerConnection;
pub use crate::core::signer::{KeypairSigner, MintSigner};
pub use crate::error::{LedgerError, Result, SessionError};
pub use crate::types::{
    AlertState, AuthToken, FailureReason, ProgramState, Quota, RejectionKind, SessionState,
    TransactionOutcome,
};
pub use crate::utils::{fetch_program_state, parse_program_state};
