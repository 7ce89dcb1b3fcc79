//! End-to-end tracking and notification flow against a mock Etherscan.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use wallet_watch::config::{MonitorConfig, WatchConfig};
use wallet_watch::lifecycle;
use wallet_watch::notify::{NotificationSink, NotifyError};
use wallet_watch::tracker::Chain;
use wallet_watch::watch::{ChatId, TickReport};
use wallet_watch::WatchService;

mod common;
use common::*;

/// Per-address transaction pages served by the mock, newest first.
type Pages = Arc<Mutex<HashMap<String, Vec<String>>>>;

async fn start_etherscan(pages: Pages) -> SocketAddr {
    common::start_programmable_backend(move |req| {
        let address = req.query_param("address").unwrap_or_default();
        let offset: usize = req
            .query_param("offset")
            .and_then(|o| o.parse().ok())
            .unwrap_or(usize::MAX);
        let hashes: Vec<String> = pages
            .lock()
            .unwrap()
            .get(&address.to_lowercase())
            .map(|page| page.iter().take(offset).cloned().collect())
            .unwrap_or_default();
        async move { (200, etherscan_txlist(&address, &hashes)) }
    })
    .await
}

fn set_page(pages: &Pages, address: &str, hashes: &[String]) {
    pages
        .lock()
        .unwrap()
        .insert(address.to_lowercase(), hashes.to_vec());
}

/// Records deliveries; chats listed in `failing` get an error instead.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(ChatId, String)>>,
    failing: Vec<ChatId>,
}

impl RecordingSink {
    fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        if self.failing.contains(&chat_id) {
            return Err(NotifyError::Rejected {
                status: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        enabled: true,
        interval_secs: 60,
        page_size: 5,
    }
}

fn cursor(service: &WatchService, chat_id: ChatId) -> Option<String> {
    service.registry().list(chat_id)[0].last_seen_hash.clone()
}

#[tokio::test]
async fn test_new_transaction_triggers_single_notification() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    assert!(service.registry().add(100, EVM_ADDR, Chain::Eth).await.unwrap());
    assert_eq!(cursor(&service, 100), Some(tx_hash(0)));

    let sink = Arc::new(RecordingSink::default());
    let monitor = service.monitor(monitor_config(), sink.clone());

    let report = monitor.tick().await;
    assert_eq!(
        report,
        TickReport {
            polled: 1,
            ..TickReport::default()
        }
    );
    assert!(sink.sent().is_empty());

    set_page(&pages, EVM_ADDR, &[tx_hash(1), tx_hash(0)]);
    let report = monitor.tick().await;
    assert_eq!(report.queued, 1);
    assert_eq!(report.delivered, 1);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    let (chat_id, text) = &sent[0];
    assert_eq!(*chat_id, 100);
    assert!(text.contains("<b>ETH</b>"));
    assert!(text.contains("📥 Incoming: 1.000000 ETH"));
    assert!(text.contains("0x0000...0001"));
    assert!(!text.contains("0x0000...0000"));
    assert!(text.contains(&format!("https://etherscan.io/address/{EVM_ADDR}")));
    assert_eq!(cursor(&service, 100), Some(tx_hash(1)));

    // Nothing new since the last tick.
    let report = monitor.tick().await;
    assert_eq!(report.queued, 0);
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test]
async fn test_unset_cursor_is_adopted_silently() {
    let pages = Pages::default();
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    service.registry().add(1, EVM_ADDR, Chain::Eth).await.unwrap();
    assert_eq!(cursor(&service, 1), None);

    let sink = Arc::new(RecordingSink::default());
    let monitor = service.monitor(monitor_config(), sink.clone());

    // Still no history: nothing to adopt.
    let report = monitor.tick().await;
    assert_eq!(report.skipped, 1);

    set_page(&pages, EVM_ADDR, &[tx_hash(9), tx_hash(8)]);
    let report = monitor.tick().await;
    assert_eq!(report.seeded, 1);
    assert_eq!(report.queued, 0);
    assert!(sink.sent().is_empty());
    assert_eq!(cursor(&service, 1), Some(tx_hash(9)));
}

#[tokio::test]
async fn test_cursor_outside_page_reports_whole_page() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    service.registry().add(1, EVM_ADDR, Chain::Eth).await.unwrap();

    let burst: Vec<String> = (1..=7).rev().map(tx_hash).collect();
    set_page(&pages, EVM_ADDR, &burst);

    let sink = Arc::new(RecordingSink::default());
    let monitor = service.monitor(monitor_config(), sink.clone());
    monitor.tick().await;

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.matches("📥 Incoming").count(), 5);
    assert_eq!(cursor(&service, 1), Some(tx_hash(7)));
}

#[tokio::test]
async fn test_failing_wallet_does_not_affect_others() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let mut trackers = trackers_for(addr);
    trackers.bsc.base_url = "http://127.0.0.1:9/v2/api".to_string();
    let service = WatchService::from_config(&trackers).unwrap();
    service.registry().add(1, EVM_ADDR, Chain::Bsc).await.unwrap();
    service.registry().add(2, EVM_ADDR, Chain::Eth).await.unwrap();

    set_page(&pages, EVM_ADDR, &[tx_hash(1), tx_hash(0)]);
    let sink = Arc::new(RecordingSink::default());
    let report = service.monitor(monitor_config(), sink.clone()).tick().await;

    assert_eq!(report.polled, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(sink.sent()[0].0, 2);
    assert_eq!(cursor(&service, 1), None);
}

#[tokio::test]
async fn test_delivery_failure_is_isolated_per_chat() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    for chat in [10, 20, 30] {
        service.registry().add(chat, EVM_ADDR, Chain::Eth).await.unwrap();
    }
    set_page(&pages, EVM_ADDR, &[tx_hash(1), tx_hash(0)]);

    let sink = Arc::new(RecordingSink {
        failing: vec![20],
        ..RecordingSink::default()
    });
    let report = service.monitor(monitor_config(), sink.clone()).tick().await;

    assert_eq!(report.queued, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);
    let chats: Vec<ChatId> = sink.sent().iter().map(|(chat, _)| *chat).collect();
    assert_eq!(chats, vec![10, 30]);

    // The cursor moved before delivery, so the failed chat is not retried.
    assert_eq!(cursor(&service, 20), Some(tx_hash(1)));
}

#[tokio::test]
async fn test_untracked_wallet_is_not_polled() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    service.registry().add(1, EVM_ADDR, Chain::Eth).await.unwrap();
    assert!(service.registry().remove(1, &EVM_ADDR.to_lowercase()));

    set_page(&pages, EVM_ADDR, &[tx_hash(1), tx_hash(0)]);
    let sink = Arc::new(RecordingSink::default());
    let report = service.monitor(monitor_config(), sink.clone()).tick().await;
    assert_eq!(report, TickReport::default());
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_running_instance_stops_on_shutdown() {
    let mut config = WatchConfig::default();
    config.api.enabled = false;
    config.monitor.interval_secs = 3600;
    config.trackers.rate_limit_min_interval_ms = 0;

    let running = lifecycle::start(&config, Arc::new(RecordingSink::default()))
        .await
        .unwrap();
    assert!(running.api_addr.is_none());

    tokio::time::timeout(Duration::from_secs(5), running.shutdown())
        .await
        .expect("shutdown did not complete");
}

#[tokio::test]
async fn test_run_sleeps_a_full_interval_before_first_tick() {
    let pages = Pages::default();
    set_page(&pages, EVM_ADDR, &[tx_hash(0)]);
    let addr = start_etherscan(pages.clone()).await;

    let service = WatchService::from_config(&trackers_for(addr)).unwrap();
    service.registry().add(7, EVM_ADDR, Chain::Eth).await.unwrap();
    set_page(&pages, EVM_ADDR, &[tx_hash(1), tx_hash(0)]);

    let sink = Arc::new(RecordingSink::default());
    let monitor = service.monitor(
        MonitorConfig {
            interval_secs: 1,
            ..monitor_config()
        },
        sink.clone(),
    );
    let shutdown = lifecycle::Shutdown::new();
    let handle = tokio::spawn(monitor.run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(sink.sent().is_empty(), "ticked before the first interval elapsed");

    tokio::time::sleep(Duration::from_millis(1200)).await;
    let chats: Vec<ChatId> = sink.sent().iter().map(|(chat, _)| *chat).collect();
    assert_eq!(chats, vec![7]);
    assert_eq!(cursor(&service, 7), Some(tx_hash(1)));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();
    assert_eq!(sink.sent().len(), 1);
}
