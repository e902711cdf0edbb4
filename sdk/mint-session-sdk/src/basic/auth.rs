use crate::error::{Result, SessionError};
use crate::types::{AuthToken, Quota};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Backend that authorizes wallets and tracks their purchase quota.
#[async_trait]
pub trait MintBackend: Send + Sync {
    /// Exchange the wallet identity for a bearer token.
    async fn verify(&self, wallet_id: &str) -> Result<AuthToken>;

    /// Whether the wallet is on the allow list. A non-success answer is
    /// `Ok(false)`; only transport failures are errors.
    async fn check_allow_list(&self, token: &AuthToken, wallet_id: &str) -> Result<bool>;

    /// Remaining purchases for the wallet. A non-success answer is
    /// `Quota::Unknown`.
    async fn fetch_quota(&self, token: &AuthToken, wallet_id: &str) -> Result<Quota>;

    /// Record one confirmed purchase and return the backend's new quota.
    async fn report_purchase(&self, token: &AuthToken, wallet_id: &str) -> Result<u64>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletBody<'a> {
    wallet_id: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// `MintBackend` over the backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(call: &str, err: reqwest::Error) -> SessionError {
    SessionError::Backend(format!("{call}: {err}"))
}

#[async_trait]
impl MintBackend for HttpBackend {
    async fn verify(&self, wallet_id: &str) -> Result<AuthToken> {
        let response = self
            .client
            .post(self.url("/api/auth/verify"))
            .json(&WalletBody { wallet_id })
            .send()
            .await
            .map_err(|e| SessionError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::Auth(format!(
                "verify returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Auth(format!("verify response: {e}")))?;
        Ok(AuthToken::new(body.token))
    }

    async fn check_allow_list(&self, token: &AuthToken, wallet_id: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.url("/api/wl/has"))
            .bearer_auth(token.as_str())
            .json(&WalletBody { wallet_id })
            .send()
            .await
            .map_err(|e| SessionError::Auth(e.to_string()))?;

        Ok(response.status().is_success())
    }

    async fn fetch_quota(&self, token: &AuthToken, wallet_id: &str) -> Result<Quota> {
        let response = self
            .client
            .get(self.url("/api/mint/get"))
            .bearer_auth(token.as_str())
            .query(&[("walletId", wallet_id)])
            .send()
            .await
            .map_err(|e| transport("fetch quota", e))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "quota request not successful");
            return Ok(Quota::Unknown);
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| transport("fetch quota", e))?;
        Ok(Quota::Known(body.count))
    }

    async fn report_purchase(&self, token: &AuthToken, wallet_id: &str) -> Result<u64> {
        let response = self
            .client
            .post(self.url("/api/mint/add"))
            .bearer_auth(token.as_str())
            .json(&WalletBody { wallet_id })
            .send()
            .await
            .map_err(|e| transport("report purchase", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Backend(format!(
                "report purchase returned {status}"
            )));
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| transport("report purchase", e))?;
        Ok(body.count)
    }
}

/// Outcome of the one-time authorization handshake.
#[derive(Debug, Clone, Default)]
pub struct HandshakeResult {
    pub token: Option<AuthToken>,
    pub allow_listed: bool,
    pub quota: Quota,
}

/// `verify -> check_allow_list -> fetch_quota`. Every failure is absorbed:
/// a rejected verify leaves the token unset, an allow-list transport error
/// means "not a member", and a failed quota read leaves the quota unknown.
pub async fn run_handshake(backend: &impl MintBackend, wallet_id: &str) -> HandshakeResult {
    let token = match backend.verify(wallet_id).await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(wallet = wallet_id, "authorization handshake aborted: {err}");
            return HandshakeResult::default();
        },
    };

    let allow_listed = match backend.check_allow_list(&token, wallet_id).await {
        Ok(member) => member,
        Err(err) => {
            tracing::warn!(wallet = wallet_id, "allow-list check failed: {err}");
            false
        },
    };

    let quota = if allow_listed {
        match backend.fetch_quota(&token, wallet_id).await {
            Ok(quota) => quota,
            Err(err) => {
                tracing::warn!(wallet = wallet_id, "quota fetch failed: {err}");
                Quota::Unknown
            },
        }
    } else {
        Quota::Unknown
    };

    tracing::info!(wallet = wallet_id, allow_listed, ?quota, "authorization handshake complete");
    HandshakeResult {
        token: Some(token),
        allow_listed,
        quota,
    }
}
