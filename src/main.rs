//! Table Cache Sweeper - maintenance daemon for a table-backed cache
//!
//! Provisions the cache table if needed and periodically deletes rows whose
//! deadline has passed. Cache reads never depend on it running.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use table_cache::{spawn_sweep_task, CacheStore, Config, SqliteGateway, SystemClock};

/// Main entry point for the sweeper.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the database and provision the cache table
/// 4. Start the background expiry sweep
/// 5. Wait for SIGINT/SIGTERM and stop the sweep
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "table_cache=info,table_cache_sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting table cache sweeper");

    let config = Config::from_env();
    info!(
        "Configuration loaded: database={}, table={}, utc_offset={}min, sweep_interval={}s",
        config.database_path.display(),
        config.table_name,
        config.utc_offset_minutes,
        config.sweep_interval
    );

    let gateway = SqliteGateway::open(&config.database_path, &config.table_name, config.wal_mode)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let cache = Arc::new(CacheStore::with_clock(
        gateway,
        SystemClock::new(config.utc_offset()),
    ));

    if cache.ensure_table().context("provisioning cache table")? {
        info!("Created table {}", config.table_name);
    }

    let sweep_handle = spawn_sweep_task(cache, config.sweep_interval);

    shutdown_signal().await?;

    sweep_handle.abort();
    warn!("Sweep task aborted");

    info!("Sweeper shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("installing SIGTERM handler")?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.context("installing Ctrl+C handler")?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.context("installing Ctrl+C handler")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
