use crate::core::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REJECTION_CODES, DEFAULT_TX_TIMEOUT_MS,
};
use crate::error::{Result, SessionError};
use crate::types::RejectionKind;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rpc_url: String,
    /// Base URL of the authorization/quota backend
    pub backend_url: String,
    /// Mint program (candy machine) account, base58
    pub candy_machine_id: Option<String>,
    pub tx_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub commitment: Commitment,
    pub error_codes: Vec<ErrorCodeEntry>,
    pub logging: LoggingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            candy_machine_id: None,
            tx_timeout_ms: DEFAULT_TX_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            commitment: Commitment::Confirmed,
            error_codes: default_error_codes(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn candy_machine_id(&self) -> Result<Pubkey> {
        let raw = self
            .candy_machine_id
            .as_deref()
            .ok_or_else(|| SessionError::Config("candy_machine_id is not set".to_string()))?;
        Pubkey::from_str(raw)
            .map_err(|e| SessionError::Config(format!("invalid candy_machine_id {raw}: {e}")))
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn rejection_codes(&self) -> HashMap<u32, RejectionKind> {
        self.error_codes.iter().map(|e| (e.code, e.kind)).collect()
    }
}

/// Commitment level a purchase waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentLevel {
    fn from(value: Commitment) -> Self {
        match value {
            Commitment::Processed => CommitmentLevel::Processed,
            Commitment::Confirmed => CommitmentLevel::Confirmed,
            Commitment::Finalized => CommitmentLevel::Finalized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeEntry {
    pub code: u32,
    pub kind: RejectionKind,
}

fn default_error_codes() -> Vec<ErrorCodeEntry> {
    DEFAULT_REJECTION_CODES
        .iter()
        .map(|(code, kind)| ErrorCodeEntry {
            code: *code,
            kind: *kind,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `MINT_LOG`
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

pub fn load_file(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SessionError::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&contents)
        .map_err(|e| SessionError::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load config from `path` (defaults when absent) and apply `MINT_*`
/// environment overrides.
pub fn load(path: Option<&Path>) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) if path.exists() => load_file(path)?,
        Some(path) => {
            tracing::warn!("config {} not found, using defaults", path.display());
            SessionConfig::default()
        },
        None => SessionConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn apply_env_overrides(config: &mut SessionConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

pub fn apply_overrides(config: &mut SessionConfig, lookup: impl Fn(&str) -> Option<String>) {
    let read = |key: &str| {
        lookup(key)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(value) = read("MINT_RPC_URL") {
        config.rpc_url = value;
    }
    if let Some(value) = read("MINT_BACKEND_URL") {
        config.backend_url = value;
    }
    if let Some(value) = read("MINT_CANDY_MACHINE_ID") {
        config.candy_machine_id = Some(value);
    }
    if let Some(value) = read("MINT_TX_TIMEOUT_MS") {
        match value.parse::<u64>() {
            Ok(ms) => config.tx_timeout_ms = ms,
            Err(err) => tracing::warn!("invalid MINT_TX_TIMEOUT_MS, ignoring: {err}"),
        }
    }
    if let Some(value) = read("MINT_POLL_INTERVAL_MS") {
        match value.parse::<u64>() {
            Ok(ms) if ms > 0 => config.poll_interval_ms = ms,
            Ok(_) => tracing::warn!("MINT_POLL_INTERVAL_MS must be positive, ignoring"),
            Err(err) => tracing::warn!("invalid MINT_POLL_INTERVAL_MS, ignoring: {err}"),
        }
    }
}
