use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Failure reported by a `LedgerConnection`.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Transport or node failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The ledger rejected the transaction with a structured error
    #[error("Transaction rejected: {0}")]
    Transaction(TransactionError),
}

impl From<solana_client::client_error::ClientError> for LedgerError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => LedgerError::Transaction(tx_err),
            None => LedgerError::Rpc(err.to_string()),
        }
    }
}

/// SDK error types for mint session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend unreachable or signature proof rejected
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// Wallet is not on the allow list
    #[error("Wallet {0} is not allow-listed")]
    AllowList(String),

    /// Mint program account could not be read or decoded
    #[error("Ledger read failed: {0}")]
    LedgerRead(String),

    /// Mint program account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Backend reports no remaining units for the wallet
    #[error("No mints remaining for wallet")]
    QuotaExhausted,

    /// Ledger attached an error to the purchase transaction
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// Confirmation polling ran past its deadline
    #[error("Confirmation timed out: {0}")]
    ConfirmationTimeout(String),

    /// Backend answered with an unexpected status or body
    #[error("Backend error: {0}")]
    Backend(String),

    /// Wallet refused or failed to sign
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Program state the SDK cannot purchase against
    #[error("Invalid program state: {0}")]
    InvalidProgramState(String),

    /// Instruction builder error
    #[error("Program error: {0}")]
    ProgramError(#[from] solana_sdk::program_error::ProgramError),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SessionError>;
