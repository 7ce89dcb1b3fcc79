//! Background polling of tracked wallets.
//!
//! # Responsibilities
//! - Sleep, then poll every tracked wallet once per tick
//! - Advance cursors and queue one notification per wallet with new activity
//! - Deliver queued notifications after polling, isolating failures per chat

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::config::MonitorConfig;
use crate::notify::render::format_notification;
use crate::notify::NotificationSink;
use crate::observability::metrics;
use crate::tracker::TrackerSet;
use crate::watch::diff::{diff_page, PageDiff};
use crate::watch::registry::WalletRegistry;
use crate::watch::types::Notification;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Wallets in the snapshot.
    pub polled: usize,
    /// Wallets whose fetch produced nothing.
    pub skipped: usize,
    /// Wallets whose unset cursor was adopted silently.
    pub seeded: usize,
    /// Notifications queued after a successful cursor advance.
    pub queued: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct WalletMonitor {
    registry: Arc<WalletRegistry>,
    trackers: Arc<TrackerSet>,
    sink: Arc<dyn NotificationSink>,
    config: MonitorConfig,
}

impl WalletMonitor {
    pub fn new(
        registry: Arc<WalletRegistry>,
        trackers: Arc<TrackerSet>,
        sink: Arc<dyn NotificationSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            registry,
            trackers,
            sink,
            config,
        }
    }

    /// Loop until `shutdown` fires. Shutdown is only observed while sleeping;
    /// a tick in progress always completes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Wallet monitor disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            page_size = self.config.page_size,
            "Wallet monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs);
        loop {
            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Wallet monitor received shutdown signal, exiting loop");
                    break;
                }
            }

            let report = self.tick().await;
            if report.queued > 0 || report.failed > 0 {
                tracing::info!(?report, "Monitor tick finished");
            } else {
                tracing::debug!(?report, "Monitor tick finished");
            }
        }
    }

    /// Poll every tracked wallet once, then deliver what was found.
    pub async fn tick(&self) -> TickReport {
        let started = Instant::now();
        let wallets = self.registry.snapshot();
        let mut report = TickReport {
            polled: wallets.len(),
            ..TickReport::default()
        };
        let mut outbox = Vec::new();

        for wallet in wallets {
            let tracker = self.trackers.get(wallet.chain);
            let page = tracker
                .transactions(&wallet.address, self.config.page_size, false)
                .await;

            match diff_page(wallet.last_seen_hash.as_deref(), &page) {
                PageDiff::Empty => report.skipped += 1,
                PageDiff::Unchanged => {}
                PageDiff::Seed(hash) => {
                    if self.registry.advance_cursor(&wallet, hash) {
                        report.seeded += 1;
                        tracing::debug!(
                            chat_id = wallet.chat_id,
                            address = %wallet.address,
                            chain = %wallet.chain,
                            "Cursor adopted on first poll"
                        );
                    }
                }
                PageDiff::New(transactions) => {
                    let newest = transactions[0].hash.clone();
                    if !self.registry.advance_cursor(&wallet, newest) {
                        metrics::record_notification("dropped");
                        tracing::debug!(
                            chat_id = wallet.chat_id,
                            address = %wallet.address,
                            "Wallet changed during tick; notification dropped"
                        );
                        continue;
                    }
                    outbox.push(Notification {
                        chat_id: wallet.chat_id,
                        explorer_link: tracker.explorer_link(&wallet.address),
                        transactions,
                        wallet,
                    });
                }
            }
        }

        report.queued = outbox.len();
        for notification in &outbox {
            let text = format_notification(notification);
            match self.sink.send(notification.chat_id, &text).await {
                Ok(()) => {
                    report.delivered += 1;
                    metrics::record_notification("delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::record_notification("failed");
                    tracing::warn!(
                        chat_id = notification.chat_id,
                        address = %notification.wallet.address,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        metrics::record_tick(started.elapsed());
        report
    }
}

impl std::fmt::Debug for WalletMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletMonitor")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
