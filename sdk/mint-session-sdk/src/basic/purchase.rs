use crate::advanced::confirm::await_confirmation;
use crate::advanced::instructions::build_mint_transaction;
use crate::basic::alert::{self, alert_for_outcome};
use crate::basic::auth::MintBackend;
use crate::basic::counter::as_request;
use crate::basic::gating::{GatewayStatus, GatingAction, GatingMode};
use crate::basic::session::MintSession;
use crate::core::connection::LedgerConnection;
use crate::core::signer::MintSigner;
use crate::error::LedgerError;
use crate::types::{AlertState, AuthToken, FailureReason, ProgramState, Quota, TransactionOutcome};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use std::sync::Arc;

/// Everything one unit needs, captured after re-validation.
struct UnitContext {
    wallet: Pubkey,
    wallet_id: String,
    token: AuthToken,
    program: ProgramState,
    signer: Arc<dyn MintSigner>,
}

impl<C: LedgerConnection, B: MintBackend> MintSession<C, B> {
    /// User clicked purchase. Gated programs first obtain a gateway
    /// credential; the purchase then runs from `handle_gateway_status`.
    ///
    /// # Returns
    /// The outcome of every unit attempted now. Empty while a gateway
    /// credential is pending or when the request was ignored; a single
    /// `Failed(Verification)` when the credential request itself failed.
    pub async fn request_purchase(&self) -> Vec<TransactionOutcome> {
        let action = {
            let mut state = self.lock();
            let mode = GatingMode::for_program(state.program_state.as_ref());
            state.gating.on_purchase_intent(mode)
        };

        match action {
            GatingAction::PurchaseNow => self.purchase_selected().await,
            GatingAction::RequestCredential => {
                let result = match &self.gateway {
                    Some(gateway) => gateway.request_token().await,
                    None => Err("no gateway verifier configured".to_string()),
                };
                match result {
                    Ok(()) => Vec::new(),
                    Err(err) => {
                        self.lock().gating.request_failed();
                        vec![self.verification_failed(err)]
                    },
                }
            },
            GatingAction::Ignore => Vec::new(),
            GatingAction::Fail(err) => vec![self.verification_failed(err)],
        }
    }

    /// Feed a status event from the gateway subsystem. Purchases exactly once
    /// when a request this session started becomes active.
    ///
    /// # Arguments
    /// * `status` - Latest status reported by the gateway
    ///
    /// # Returns
    /// Outcomes of the purchase this event triggered, if any
    pub async fn handle_gateway_status(&self, status: GatewayStatus) -> Vec<TransactionOutcome> {
        let action = self.lock().gating.on_status(status);
        match action {
            GatingAction::PurchaseNow => {
                tracing::info!("gateway verified, purchasing");
                let outcomes = self.purchase_selected().await;
                self.lock().gating.consume();
                outcomes
            },
            GatingAction::Fail(err) => vec![self.verification_failed(err)],
            GatingAction::RequestCredential | GatingAction::Ignore => Vec::new(),
        }
    }

    fn verification_failed(&self, err: String) -> TransactionOutcome {
        tracing::warn!("gateway verification failed: {err}");
        let outcome = TransactionOutcome::Failed(FailureReason::Verification(err));
        self.lock().alert = alert_for_outcome(&outcome);
        outcome
    }

    /// Purchase as many units as the counter holds (unset or 0 buys one).
    pub async fn purchase_selected(&self) -> Vec<TransactionOutcome> {
        let units = self.lock().counter.units_to_purchase();
        self.purchase(units).await
    }

    /// Purchase `units` units one at a time and return every unit's outcome.
    ///
    /// A unit that fails or times out does not stop the loop; an exhausted
    /// quota or a failed re-validation does. The session is refreshed
    /// afterwards regardless of the result.
    ///
    /// # Arguments
    /// * `units` - Units to attempt, one transaction each
    ///
    /// # Returns
    /// One outcome per attempted unit, in submission order. Empty when a
    /// purchase is already in flight or the first re-validation failed.
    pub async fn purchase(&self, units: u64) -> Vec<TransactionOutcome> {
        {
            let mut state = self.lock();
            if state.minting {
                tracing::debug!("purchase already in flight, ignoring request");
                return Vec::new();
            }
            state.minting = true;
        }

        let outcomes = self.purchase_units(units).await;

        self.lock().minting = false;
        self.refresh().await;
        outcomes
    }

    async fn purchase_units(&self, units: u64) -> Vec<TransactionOutcome> {
        let mut outcomes = Vec::new();

        for unit in 0..units {
            let ctx = match self.unit_context() {
                Ok(ctx) => ctx,
                Err(message) => {
                    tracing::warn!(unit, "purchase aborted: {message}");
                    self.lock().alert = AlertState::failure(message);
                    break;
                },
            };

            match self.backend.fetch_quota(&ctx.token, &ctx.wallet_id).await {
                Ok(Quota::Known(count)) if count > 0 => self.set_quota(Quota::Known(count)),
                Ok(Quota::Known(_)) => {
                    self.set_quota(Quota::Known(0));
                    outcomes.push(self.fail_unit(FailureReason::QuotaExhausted));
                    break;
                },
                Ok(Quota::Unknown) => {
                    outcomes.push(self.fail_unit(FailureReason::QuotaUnavailable));
                    break;
                },
                Err(err) => {
                    tracing::warn!(unit, "quota check failed: {err}");
                    outcomes.push(self.fail_unit(FailureReason::QuotaUnavailable));
                    break;
                },
            }

            let outcome = self.submit_and_confirm(&ctx).await;
            match &outcome {
                TransactionOutcome::Confirmed(signature) => {
                    tracing::info!(unit, %signature, "purchase confirmed");
                    self.record_purchase(&ctx).await;
                },
                failed => {
                    tracing::warn!(unit, outcome = ?failed, "purchase unit failed");
                    self.lock().alert = alert_for_outcome(failed);
                },
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    fn unit_context(&self) -> Result<UnitContext, &'static str> {
        let Some(signer) = self.signer.clone() else {
            return Err(alert::NOT_CONNECTED);
        };
        if self.lock().wallet.is_none() {
            return Err(alert::NOT_CONNECTED);
        }
        self.ensure_ready()
            .map_err(|err| alert::precondition_message(&err))?;

        let state = self.lock();
        match (state.wallet, &state.auth_token, &state.program_state) {
            (Some(wallet), Some(token), Some(program)) => Ok(UnitContext {
                wallet,
                wallet_id: wallet.to_string(),
                token: token.clone(),
                program: program.clone(),
                signer,
            }),
            _ => Err(alert::NOT_LOADED),
        }
    }

    fn fail_unit(&self, reason: FailureReason) -> TransactionOutcome {
        let outcome = TransactionOutcome::Failed(reason);
        self.lock().alert = alert_for_outcome(&outcome);
        outcome
    }

    async fn submit_and_confirm(&self, ctx: &UnitContext) -> TransactionOutcome {
        let mint = Keypair::new();
        let tx = match build_mint_transaction(
            &self.connection,
            &self.options.program_id,
            &ctx.program,
            &ctx.wallet,
            &mint,
        )
        .await
        {
            Ok(tx) => tx,
            Err(err) => {
                return TransactionOutcome::Failed(FailureReason::Submission(err.to_string()))
            },
        };

        let tx = match ctx.signer.sign_transaction(tx).await {
            Ok(tx) => tx,
            Err(err) => return TransactionOutcome::Failed(FailureReason::Signing(err)),
        };

        let signature = match self.connection.send_transaction(&tx).await {
            Ok(signature) => signature,
            Err(LedgerError::Transaction(err)) => {
                return TransactionOutcome::Failed(FailureReason::Rejected(
                    self.options.classifier.classify(&err),
                ))
            },
            Err(err) => {
                return TransactionOutcome::Failed(FailureReason::Submission(err.to_string()))
            },
        };
        tracing::info!(%signature, "purchase submitted");

        await_confirmation(
            &self.connection,
            &self.options.classifier,
            &signature,
            self.options.tx_timeout,
            self.options.commitment,
            self.options.poll_interval,
        )
        .await
    }

    /// Report a confirmed unit. The backend's count is authoritative for both
    /// the quota and the counter; nothing is incremented locally.
    async fn record_purchase(&self, ctx: &UnitContext) {
        match self
            .backend
            .report_purchase(&ctx.token, &ctx.wallet_id)
            .await
        {
            Ok(count) => {
                let mut state = self.lock();
                state.backend_quota = Quota::Known(count);
                let available = state.available_units();
                state.counter.set(Some(as_request(count)), available);
                state.alert = AlertState::success(alert::MINT_SUCCEEDED);
            },
            Err(err) => {
                tracing::warn!(wallet = %ctx.wallet, "purchase report failed: {err}");
                self.lock().alert = AlertState::failure(alert::NOT_RECORDED);
            },
        }
    }
}
