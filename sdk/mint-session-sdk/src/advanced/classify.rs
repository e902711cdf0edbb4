use crate::core::constants::DEFAULT_REJECTION_CODES;
use crate::types::{Rejection, RejectionKind};
use solana_sdk::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use std::collections::HashMap;

/// Maps structured ledger errors onto user-facing rejection categories.
///
/// Program custom codes are looked up in a table so the numeric contract
/// with the mint program stays data.
#[derive(Debug, Clone)]
pub struct RejectionClassifier {
    codes: HashMap<u32, RejectionKind>,
}

impl Default for RejectionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_REJECTION_CODES.iter().copied().collect())
    }
}

impl RejectionClassifier {
    pub fn new(codes: HashMap<u32, RejectionKind>) -> Self {
        Self { codes }
    }

    pub fn classify(&self, err: &TransactionError) -> Rejection {
        let raw = err.to_string();
        match err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => Rejection {
                kind: self
                    .codes
                    .get(code)
                    .copied()
                    .unwrap_or(RejectionKind::Generic),
                code: Some(*code),
                raw,
            },
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. }
            | TransactionError::InstructionError(_, InstructionError::InsufficientFunds) => {
                Rejection {
                    kind: RejectionKind::InsufficientFunds,
                    code: None,
                    raw,
                }
            },
            _ => Rejection {
                kind: RejectionKind::Generic,
                code: None,
                raw,
            },
        }
    }
}
