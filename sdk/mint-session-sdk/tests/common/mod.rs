#![allow(dead_code)]

use async_trait::async_trait;
use mint_session_sdk::basic::auth::MintBackend;
use mint_session_sdk::basic::gating::GatewayVerifier;
use mint_session_sdk::core::connection::{LedgerConnection, SignatureStatus};
use mint_session_sdk::core::constants::CANDY_MACHINE_PROGRAM_ID;
use mint_session_sdk::core::signer::KeypairSigner;
use mint_session_sdk::error::{LedgerError, Result as SdkResult, SessionError};
use mint_session_sdk::state::{CandyMachineAccount, CandyMachineData, GatekeeperLayout};
use mint_session_sdk::types::{AuthToken, Quota};
use mint_session_sdk::{MintSession, SessionOptions};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Ordered record of side effects shared by the fakes.
pub type EventLog = Arc<std::sync::Mutex<Vec<String>>>;

fn record(events: &EventLog, event: impl Into<String>) {
    events
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(event.into());
}

//=============================================================================
// Ledger
//=============================================================================

/// What the ledger does with the next submitted transaction.
#[derive(Debug, Clone)]
pub enum Submit {
    /// Accepted and confirmed on the first status poll
    Confirm,
    /// Rejected at submission with a structured error
    Reject(TransactionError),
    /// Accepted, then reported failed by the status poll
    FailOnChain(TransactionError),
    /// Accepted but never visible to status polls
    Pending,
}

struct LedgerInner {
    accounts: HashMap<Pubkey, Account>,
    script: VecDeque<Submit>,
    statuses: HashMap<Signature, Option<SignatureStatus>>,
    submitted: Vec<Transaction>,
    fail_reads: bool,
}

/// In-memory ledger holding one mint program account.
#[derive(Clone)]
pub struct MockLedger {
    inner: Arc<Mutex<LedgerInner>>,
    events: EventLog,
    pub candy_machine: Pubkey,
}

impl MockLedger {
    pub fn new(account: CandyMachineAccount, events: EventLog) -> Self {
        let candy_machine = Pubkey::new_unique();
        let mut accounts = HashMap::new();
        accounts.insert(candy_machine, program_account(&account));
        Self {
            inner: Arc::new(Mutex::new(LedgerInner {
                accounts,
                script: VecDeque::new(),
                statuses: HashMap::new(),
                submitted: Vec::new(),
                fail_reads: false,
            })),
            events,
            candy_machine,
        }
    }

    /// Queue behaviors for upcoming submissions. Unscripted submissions confirm.
    pub async fn script(&self, steps: impl IntoIterator<Item = Submit>) {
        self.inner.lock().await.script.extend(steps);
    }

    pub async fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().await.fail_reads = fail;
    }

    pub async fn submissions(&self) -> usize {
        self.inner.lock().await.submitted.len()
    }

    pub async fn last_submitted(&self) -> Option<Transaction> {
        self.inner.lock().await.submitted.last().cloned()
    }

    pub async fn redeemed(&self) -> u64 {
        let inner = self.inner.lock().await;
        let account = &inner.accounts[&self.candy_machine];
        CandyMachineAccount::decode(&account.data)
            .unwrap()
            .items_redeemed
    }

    pub async fn set_redeemed(&self, redeemed: u64) {
        let mut inner = self.inner.lock().await;
        if let Some(account) = inner.accounts.get_mut(&self.candy_machine) {
            let mut decoded = CandyMachineAccount::decode(&account.data).unwrap();
            decoded.items_redeemed = redeemed;
            account.data = decoded.encode().unwrap();
        }
    }

    async fn redeem_one(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(account) = inner.accounts.get_mut(&self.candy_machine) {
            let mut decoded = CandyMachineAccount::decode(&account.data).unwrap();
            decoded.items_redeemed += 1;
            account.data = decoded.encode().unwrap();
        }
    }
}

fn program_account(account: &CandyMachineAccount) -> Account {
    Account {
        lamports: 1_000_000_000,
        data: account.encode().unwrap(),
        owner: CANDY_MACHINE_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

#[async_trait]
impl LedgerConnection for MockLedger {
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        let signature = *tx
            .signatures
            .first()
            .ok_or_else(|| LedgerError::Rpc("unsigned transaction".to_string()))?;

        let step = {
            let mut inner = self.inner.lock().await;
            inner.submitted.push(tx.clone());
            inner.script.pop_front().unwrap_or(Submit::Confirm)
        };
        record(&self.events, "send");

        let status = match step {
            Submit::Reject(err) => return Err(LedgerError::Transaction(err)),
            Submit::Confirm => {
                self.redeem_one().await;
                Some(SignatureStatus {
                    commitment: CommitmentLevel::Confirmed,
                    confirmations: Some(1),
                    err: None,
                })
            },
            Submit::FailOnChain(err) => Some(SignatureStatus {
                commitment: CommitmentLevel::Processed,
                confirmations: Some(0),
                err: Some(err),
            }),
            Submit::Pending => None,
        };
        self.inner.lock().await.statuses.insert(signature, status);
        Ok(signature)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(LedgerError::Rpc("node unavailable".to_string()));
        }
        Ok(inner.accounts.get(pubkey).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(Hash::new_unique())
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _data_len: usize,
    ) -> Result<u64, LedgerError> {
        Ok(1_461_600)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        record(&self.events, "poll");
        let inner = self.inner.lock().await;
        Ok(inner.statuses.get(signature).cloned().flatten())
    }
}

//=============================================================================
// Backend
//=============================================================================

#[derive(Default)]
struct BackendInner {
    reject_verify: bool,
    allow_listed: bool,
    /// `None` answers non-2xx
    quota: Option<u64>,
    fail_report: bool,
    verify_delay: Duration,
    verify_calls: usize,
    allow_list_calls: usize,
    quota_calls: usize,
    report_calls: usize,
}

/// In-memory authorization backend. Reports decrement the quota.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<std::sync::Mutex<BackendInner>>,
    events: EventLog,
}

impl MockBackend {
    pub fn new(allow_listed: bool, quota: Option<u64>, events: EventLog) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(BackendInner {
                allow_listed,
                quota,
                ..BackendInner::default()
            })),
            events,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut BackendInner) -> R) -> R {
        f(&mut self.inner.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn set_verify_delay(&self, delay: Duration) {
        self.with(|b| b.verify_delay = delay);
    }

    pub fn set_reject_verify(&self, reject: bool) {
        self.with(|b| b.reject_verify = reject);
    }

    pub fn set_quota(&self, quota: Option<u64>) {
        self.with(|b| b.quota = quota);
    }

    pub fn set_fail_report(&self, fail: bool) {
        self.with(|b| b.fail_report = fail);
    }

    pub fn verify_calls(&self) -> usize {
        self.with(|b| b.verify_calls)
    }

    pub fn allow_list_calls(&self) -> usize {
        self.with(|b| b.allow_list_calls)
    }

    pub fn quota_calls(&self) -> usize {
        self.with(|b| b.quota_calls)
    }

    pub fn report_calls(&self) -> usize {
        self.with(|b| b.report_calls)
    }
}

#[async_trait]
impl MintBackend for MockBackend {
    async fn verify(&self, wallet_id: &str) -> SdkResult<AuthToken> {
        let (delay, reject) = self.with(|b| {
            b.verify_calls += 1;
            (b.verify_delay, b.reject_verify)
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if reject {
            return Err(SessionError::Auth("signature proof rejected".to_string()));
        }
        Ok(AuthToken::new(format!("token-{wallet_id}")))
    }

    async fn check_allow_list(&self, _token: &AuthToken, _wallet_id: &str) -> SdkResult<bool> {
        Ok(self.with(|b| {
            b.allow_list_calls += 1;
            b.allow_listed
        }))
    }

    async fn fetch_quota(&self, _token: &AuthToken, _wallet_id: &str) -> SdkResult<Quota> {
        Ok(self.with(|b| {
            b.quota_calls += 1;
            match b.quota {
                Some(count) => Quota::Known(count),
                None => Quota::Unknown,
            }
        }))
    }

    async fn report_purchase(&self, _token: &AuthToken, _wallet_id: &str) -> SdkResult<u64> {
        let result = self.with(|b| {
            b.report_calls += 1;
            if b.fail_report {
                return Err(SessionError::Backend("report purchase returned 500".to_string()));
            }
            let count = b.quota.unwrap_or(0).saturating_sub(1);
            b.quota = Some(count);
            Ok(count)
        });
        record(&self.events, "report");
        result
    }
}

//=============================================================================
// Gateway
//=============================================================================

#[derive(Default)]
pub struct MockGateway {
    pub fail: bool,
    pub requests: std::sync::Mutex<usize>,
}

impl MockGateway {
    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl GatewayVerifier for MockGateway {
    async fn request_token(&self) -> Result<(), String> {
        *self.requests.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        if self.fail {
            Err("user closed the verification window".to_string())
        } else {
            Ok(())
        }
    }
}

//=============================================================================
// Fixtures
//=============================================================================

pub fn candy_machine(items_available: u64, redeemed: u64) -> CandyMachineAccount {
    CandyMachineAccount {
        authority: Pubkey::new_unique().to_bytes(),
        wallet: Pubkey::new_unique().to_bytes(),
        token_mint: None,
        items_redeemed: redeemed,
        data: CandyMachineData {
            uuid: "test01".to_string(),
            price: 100_000_000,
            symbol: "MINT".to_string(),
            seller_fee_basis_points: 500,
            max_supply: 0,
            is_mutable: true,
            retain_authority: true,
            go_live_date: Some(0),
            end_settings: None,
            creators: vec![],
            hidden_settings: None,
            whitelist_mint_settings: None,
            items_available,
            gatekeeper: None,
        },
    }
}

pub fn gated_candy_machine(network: Pubkey) -> CandyMachineAccount {
    let mut account = candy_machine(10, 0);
    account.data.gatekeeper = Some(GatekeeperLayout {
        gatekeeper_network: network.to_bytes(),
        expire_on_use: true,
    });
    account
}

pub struct TestContext {
    pub session: MintSession<MockLedger, MockBackend>,
    pub ledger: MockLedger,
    pub backend: MockBackend,
    pub events: EventLog,
    pub wallet: Pubkey,
}

impl TestContext {
    /// Session over a connected wallet, before any refresh.
    pub fn new(account: CandyMachineAccount, allow_listed: bool, quota: Option<u64>) -> Self {
        let events = EventLog::default();
        let ledger = MockLedger::new(account, events.clone());
        let backend = MockBackend::new(allow_listed, quota, events.clone());

        let options = SessionOptions::new(ledger.candy_machine)
            .with_tx_timeout(Duration::from_millis(60))
            .with_poll_interval(Duration::from_millis(5));
        let mut session = MintSession::new(ledger.clone(), backend.clone(), options);

        let keypair = Keypair::new();
        let wallet = keypair.pubkey();
        session.connect_wallet(Arc::new(KeypairSigner::new(keypair)));

        Self {
            session,
            ledger,
            backend,
            events,
            wallet,
        }
    }

    /// Connected, refreshed session over an allow-listed wallet.
    pub async fn ready(account: CandyMachineAccount, quota: u64) -> Self {
        let ctx = Self::new(account, true, Some(quota));
        ctx.session.refresh().await;
        ctx
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
