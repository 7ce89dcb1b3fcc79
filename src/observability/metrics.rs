//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watch_chain_requests_total` (counter): chain API calls by chain, operation, outcome
//! - `watch_cache_lookups_total` (counter): cache hits/misses by cache
//! - `watch_tracked_wallets` (gauge): wallets currently in the registry
//! - `watch_monitor_tick_seconds` (histogram): duration of one monitor tick
//! - `watch_notifications_total` (counter): deliveries by outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_api_request(chain: &'static str, operation: &'static str, outcome: &'static str) {
    counter!(
        "watch_chain_requests_total",
        "chain" => chain,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("watch_cache_lookups_total", "cache" => cache, "result" => result).increment(1);
}

pub fn record_tracked_wallets(count: usize) {
    gauge!("watch_tracked_wallets").set(count as f64);
}

pub fn record_tick(duration: Duration) {
    histogram!("watch_monitor_tick_seconds").record(duration.as_secs_f64());
}

pub fn record_notification(outcome: &'static str) {
    counter!("watch_notifications_total", "outcome" => outcome).increment(1);
}
