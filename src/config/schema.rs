//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet watcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Interactive HTTP API settings.
    pub api: ApiConfig,

    /// Background monitor loop settings.
    pub monitor: MonitorConfig,

    /// Chain API access settings shared by all trackers.
    pub trackers: TrackersConfig,

    /// Notification delivery settings.
    pub notifications: NotificationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Interactive API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Enable the interactive API.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8081").
    pub bind_address: String,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Monitor loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Enable the background monitor.
    pub enabled: bool,

    /// Seconds slept before every tick.
    pub interval_secs: u64,

    /// Transactions fetched per wallet per tick (detection window).
    pub page_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            page_size: 5,
        }
    }
}

/// Settings shared by every chain tracker plus per-chain endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackersConfig {
    /// Lifetime of cached balance and transaction lookups.
    pub cache_ttl_secs: u64,

    /// Minimum spacing between two outbound calls to the same chain API.
    pub rate_limit_min_interval_ms: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    pub ton: TonConfig,
    pub ethereum: EtherscanConfig,
    pub bsc: EtherscanConfig,
}

impl Default for TrackersConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            rate_limit_min_interval_ms: 250,
            request_timeout_secs: 10,
            ton: TonConfig::default(),
            ethereum: EtherscanConfig::default(),
            bsc: EtherscanConfig::default(),
        }
    }
}

/// toncenter v2 endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TonConfig {
    pub base_url: String,
    pub explorer_url: String,
    /// Optional toncenter key; anonymous access is heavily throttled.
    pub api_key: Option<String>,
}

impl Default for TonConfig {
    fn default() -> Self {
        Self {
            base_url: "https://toncenter.com/api/v2".to_string(),
            explorer_url: "https://tonscan.org".to_string(),
            api_key: None,
        }
    }
}

/// Etherscan v2 multichain gateway endpoint for one EVM chain.
///
/// `chain_id` and `explorer_url` default per network when left unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EtherscanConfig {
    pub base_url: String,
    pub explorer_url: Option<String>,
    /// Chain ID sent as `chainid`.
    pub chain_id: Option<u64>,
    pub api_key: Option<String>,
}

impl Default for EtherscanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.etherscan.io/v2/api".to_string(),
            explorer_url: None,
            chain_id: None,
            api_key: None,
        }
    }
}

/// Notification delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NotificationConfig {
    /// Telegram delivery. When absent, notifications are only logged.
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
