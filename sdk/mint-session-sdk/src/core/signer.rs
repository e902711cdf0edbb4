use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;

/// Abstraction for the wallet that pays for and signs purchases.
/// This allows the SDK to work with:
/// 1. Local Keypairs (Backend/CLI)
/// 2. Wallet Adapters (Frontend - the adapter signs the partially signed transaction)
#[async_trait]
pub trait MintSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Add the wallet signature to a transaction that may already carry
    /// other partial signatures. Returns Err if the user declined or signing failed.
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, String>;
}

/// `MintSigner` backed by a local keypair.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl MintSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, String> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| e.to_string())?;
        Ok(tx)
    }
}
