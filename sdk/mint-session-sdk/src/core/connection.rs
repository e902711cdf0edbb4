use crate::error::LedgerError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};

/// Status of a submitted signature as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    /// Highest commitment the transaction has reached
    pub commitment: CommitmentLevel,

    /// Confirmations so far, `None` once rooted
    pub confirmations: Option<usize>,

    /// Error attached by the ledger if the transaction failed
    pub err: Option<TransactionError>,
}

impl SignatureStatus {
    pub fn satisfies(&self, requested: CommitmentLevel) -> bool {
        rank(self.commitment) >= rank(requested)
    }
}

fn rank(level: CommitmentLevel) -> u8 {
    match level {
        CommitmentLevel::Processed => 0,
        CommitmentLevel::Confirmed => 1,
        CommitmentLevel::Finalized => 2,
    }
}

/// Ledger operations the session needs. Implemented for the nonblocking
/// `RpcClient`; tests provide in-memory ledgers.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError>;
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, LedgerError>;
    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError>;
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError>;
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError>;
}

#[async_trait]
impl LedgerConnection for RpcClient {
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        Ok(RpcClient::send_transaction(self, tx).await?)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let response = self
            .get_account_with_commitment(pubkey, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError> {
        Ok(RpcClient::get_minimum_balance_for_rent_exemption(self, data_len).await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let response = self.get_signature_statuses(&[*signature]).await?;
        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(None),
        };

        let commitment = if status.satisfies_commitment(CommitmentConfig::finalized()) {
            CommitmentLevel::Finalized
        } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
            CommitmentLevel::Confirmed
        } else {
            CommitmentLevel::Processed
        };

        Ok(Some(SignatureStatus {
            commitment,
            confirmations: status.confirmations,
            err: status.err,
        }))
    }
}
