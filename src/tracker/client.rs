//! Rate-limited JSON-over-HTTP client shared by the chain trackers.
//!
//! # Responsibilities
//! - Gate every outbound call through the tracker's `RateLimiter`
//! - Enforce the configured request timeout
//! - Map non-2xx statuses and undecodable bodies to `TrackerError`
//! - Hold the per-tracker balance and transaction caches

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::TrackersConfig;
use crate::observability::metrics;
use crate::tracker::cache::TtlCache;
use crate::tracker::rate_limit::RateLimiter;
use crate::tracker::types::{Balance, Chain, Transaction, TrackerError};

/// HTTP plumbing and caches owned by one tracker.
pub struct TrackerCore {
    chain: Chain,
    http: reqwest::Client,
    limiter: RateLimiter,
    pub(crate) balances: TtlCache<String, Balance>,
    pub(crate) transactions: TtlCache<String, Vec<Transaction>>,
}

impl TrackerCore {
    pub fn new(chain: Chain, settings: &TrackersConfig) -> Result<Self, TrackerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("wallet-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let ttl = Duration::from_secs(settings.cache_ttl_secs);

        Ok(Self {
            chain,
            http,
            limiter: RateLimiter::new(Duration::from_millis(settings.rate_limit_min_interval_ms)),
            balances: TtlCache::new("balance", ttl),
            transactions: TtlCache::new("transactions", ttl),
        })
    }

    /// Issue a rate-limited GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        self.limiter.wait().await;

        let result = self.send(url, query).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(TrackerError::Status(_)) => "http_error",
            Err(TrackerError::Malformed(_)) => "malformed",
            Err(_) => "transport_error",
        };
        metrics::record_api_request(self.chain.as_str(), operation, outcome);
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TrackerError::Malformed(e.to_string()))
    }
}

impl std::fmt::Debug for TrackerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerCore")
            .field("chain", &self.chain)
            .field("min_interval", &self.limiter.min_interval())
            .field("cached_balances", &self.balances.len())
            .field("cached_pages", &self.transactions.len())
            .finish()
    }
}
