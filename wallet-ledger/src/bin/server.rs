//! Wallet ledger process
//!
//! Wires configuration, logging and the ledger actor. Command/query handlers
//! attach to the [`wallet_ledger::LedgerHandle`] created here.

use anyhow::Context;
use wallet_ledger::{spawn_ledger_actor, Config, Ledger, Metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting wallet ledger");

    // Load configuration: explicit file, else environment
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    // Open ledger
    let ledger = Ledger::from_config(&config).context("opening ledger")?;
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        persistent = ledger.is_persistent(),
        transactions = ledger.len(),
        wallets = ledger.wallet_count(),
        aggregates = ledger.aggregate_count(),
        "Ledger opened successfully"
    );

    let metrics =
        Metrics::new().map_err(|e| anyhow::anyhow!("registering metrics: {}", e))?;
    let handle = spawn_ledger_actor(ledger, config.actor.mailbox_capacity, metrics);

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down wallet ledger");
    let ledger = handle.shutdown().await?;
    tracing::info!(transactions = ledger.len(), "Ledger closed");

    Ok(())
}
