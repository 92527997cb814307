//! FinLedger server binary
//!
//! Opens the store, wires the operation layer, and waits for shutdown. The
//! transport layer (HTTP routing, auth) is owned by the embedding service.

use ledger_ops::{Config, Ledger};
use ledger_store::Storage;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting FinLedger server");

    // Load configuration
    let config = Config::from_env()?;

    // Open storage and wire the operation layer
    let storage = Arc::new(Storage::open(&config.store)?);
    let _ledger = Ledger::new(storage.clone(), storage, config.exclusion.clone())?;
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Ledger opened successfully"
    );

    // TODO: expose the operations and the metrics registry over a transport here
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down FinLedger server");
    Ok(())
}
