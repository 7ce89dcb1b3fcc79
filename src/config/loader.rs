//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{TelegramConfig, WatchConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<WatchConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => WatchConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-provided secrets and tunables onto `config`.
///
/// Empty values are ignored so an unset-but-exported variable does not wipe
/// a value from the file.
pub fn apply_overrides<F>(config: &mut WatchConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("BOT_TOKEN") {
        config
            .notifications
            .telegram
            .get_or_insert_with(TelegramConfig::default)
            .bot_token = token;
    }
    if let Some(key) = get("ETHERSCAN_API_KEY") {
        config.trackers.ethereum.api_key = Some(key);
    }
    if let Some(key) = get("BSCSCAN_API_KEY") {
        config.trackers.bsc.api_key = Some(key);
    }
    if let Some(key) = get("TONCENTER_API_KEY") {
        config.trackers.ton.api_key = Some(key);
    }
    if let Some(key) = get("WATCH_API_KEY") {
        config.api.api_key = key;
    }
    if let Some(value) = get("NOTIFY_INTERVAL_SECONDS") {
        config.monitor.interval_secs = parse_env("NOTIFY_INTERVAL_SECONDS", value)?;
    }
    if let Some(value) = get("CACHE_TTL_SECONDS") {
        config.trackers.cache_ttl_secs = parse_env("CACHE_TTL_SECONDS", value)?;
    }
    if let Some(value) = get("RATE_LIMIT_MIN_INTERVAL") {
        // Seconds, fractional allowed (e.g. "0.25").
        let secs: f64 = parse_env("RATE_LIMIT_MIN_INTERVAL", value.clone())?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::Env {
                name: "RATE_LIMIT_MIN_INTERVAL",
                value,
            });
        }
        config.trackers.rate_limit_min_interval_ms = (secs * 1000.0).round() as u64;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level.to_lowercase();
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { name, value })
}
