//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, page size bounded)
//! - Validate endpoint URLs and bind addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WatchConfig;

/// Largest page the explorer APIs will reliably serve in one call.
pub const MAX_PAGE_SIZE: usize = 100;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &WatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.monitor.interval_secs == 0 {
        errors.push(ValidationError::new("monitor.interval_secs", "must be greater than 0"));
    }
    if config.monitor.page_size == 0 || config.monitor.page_size > MAX_PAGE_SIZE {
        errors.push(ValidationError::new(
            "monitor.page_size",
            format!("must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    if config.trackers.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "trackers.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    check_url(&mut errors, "trackers.ton.base_url", &config.trackers.ton.base_url);
    check_url(&mut errors, "trackers.ton.explorer_url", &config.trackers.ton.explorer_url);
    check_url(&mut errors, "trackers.ethereum.base_url", &config.trackers.ethereum.base_url);
    check_url(&mut errors, "trackers.bsc.base_url", &config.trackers.bsc.base_url);
    if let Some(url) = &config.trackers.ethereum.explorer_url {
        check_url(&mut errors, "trackers.ethereum.explorer_url", url);
    }
    if let Some(url) = &config.trackers.bsc.explorer_url {
        check_url(&mut errors, "trackers.bsc.explorer_url", url);
    }

    if let Some(telegram) = &config.notifications.telegram {
        if telegram.bot_token.trim().is_empty() {
            errors.push(ValidationError::new(
                "notifications.telegram.bot_token",
                "must not be empty when telegram is configured",
            ));
        }
        check_url(&mut errors, "notifications.telegram.api_url", &telegram.api_url);
    }

    if config.api.enabled {
        check_socket_addr(&mut errors, "api.bind_address", &config.api.bind_address);
        if config.api.api_key.is_empty() {
            errors.push(ValidationError::new("api.api_key", "must not be empty"));
        }
    }
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid socket address '{value}'")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TelegramConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WatchConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = WatchConfig::default();
        config.monitor.interval_secs = 0;
        config.monitor.page_size = 0;
        config.trackers.ton.base_url = "not a url".to_string();
        config.notifications.telegram = Some(TelegramConfig::default());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "monitor.interval_secs",
                "monitor.page_size",
                "trackers.ton.base_url",
                "notifications.telegram.bot_token",
            ]
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = WatchConfig::default();
        config.trackers.bsc.explorer_url = Some("ftp://bscscan.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "trackers.bsc.explorer_url");
    }

    #[test]
    fn test_disabled_api_skips_bind_check() {
        let mut config = WatchConfig::default();
        config.api.enabled = false;
        config.api.bind_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
