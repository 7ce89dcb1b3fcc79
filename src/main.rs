//! wallet-watch
//!
//! Multi-chain wallet watcher: interactive balance/transaction lookups and
//! push notifications for tracked TON, Ethereum and BSC wallets.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     WALLET WATCH                     │
//!                 │                                                      │
//!  API client ────┼─▶ api (axum) ──▶ WatchService ──▶ WalletRegistry    │
//!                 │                      │                  ▲            │
//!                 │                      ▼                  │ cursors    │
//!                 │                 TrackerSet ◀──── WalletMonitor       │
//!                 │           (cache + rate limit)          │            │
//!                 │                      │                  ▼            │
//!  Chain APIs ◀───┼──────────────────────┘           NotificationSink ───┼──▶ Telegram
//!                 │                                                      │
//!                 │  config · observability · lifecycle                  │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use wallet_watch::config::load_config;
use wallet_watch::lifecycle::{self, signals::wait_for_shutdown_signal};
use wallet_watch::notify::build_sink;
use wallet_watch::observability::{logging::init_logging, metrics::init_metrics};

#[derive(Parser)]
#[command(name = "wallet-watch", version, about = "Multi-chain wallet watcher")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "WATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wallet-watch starting");
    tracing::info!(
        api_enabled = config.api.enabled,
        api_bind = %config.api.bind_address,
        monitor_interval_secs = config.monitor.interval_secs,
        page_size = config.monitor.page_size,
        cache_ttl_secs = config.trackers.cache_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let sink = build_sink(&config.notifications)?;
    let running = lifecycle::start(&config, sink).await?;
    if let Some(addr) = running.api_addr {
        tracing::info!(address = %addr, "Ready");
    }

    wait_for_shutdown_signal().await;
    running.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
