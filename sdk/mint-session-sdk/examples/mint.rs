// Example: Purchasing units from a mint program
//
// This example demonstrates how to:
// 1. Load the session config (file + MINT_* environment overrides)
// 2. Connect a local keypair wallet
// 3. Refresh the session (handshake, program state, quota)
// 4. Purchase the requested number of units

use clap::Parser;
use mint_session_sdk::basic::view::SessionView;
use mint_session_sdk::core::config;
use mint_session_sdk::{logging, HttpBackend, KeypairSigner, MintSession, SessionOptions};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::read_keypair_file;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
struct Args {
    /// Session config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wallet keypair paying for the purchase
    #[arg(long)]
    keypair: PathBuf,

    /// Units to purchase
    #[arg(long, default_value_t = 1)]
    units: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Config and logging
    let config = config::load(args.config.as_deref())?;
    logging::init(&config.logging);

    // 2. Connections
    let options = SessionOptions::from_config(&config)?;
    let rpc = RpcClient::new_with_commitment(
        config.rpc_url.clone(),
        CommitmentConfig {
            commitment: options.commitment,
        },
    );
    let backend = HttpBackend::new(config.backend_url.clone());
    let keypair = read_keypair_file(&args.keypair)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", args.keypair.display()))?;

    let mut session = MintSession::new(rpc, backend, options);
    session.connect_wallet(Arc::new(KeypairSigner::new(keypair)));

    // 3. Handshake + program state
    session.refresh().await;
    session.ensure_ready()?;
    if session.view() != SessionView::Mint {
        anyhow::bail!("wallet cannot mint: {:?}", session.view());
    }
    println!("Available units: {}", session.available_units());

    // 4. Purchase
    session.set_counter(Some(args.units));
    for outcome in session.purchase_selected().await {
        match outcome.into_result() {
            Ok(signature) => println!("  confirmed {signature}"),
            Err(err) => println!("  failed: {err}"),
        }
    }
    println!("{}", session.snapshot().alert.message);

    Ok(())
}
