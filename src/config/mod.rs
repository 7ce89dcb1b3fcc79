//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: BOT_TOKEN, API keys, intervals)
//!     → validation.rs (semantic checks)
//!     → WatchConfig (validated, immutable)
//!     → handed to trackers, monitor, API and observability at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment rather than the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, EtherscanConfig, MonitorConfig, NotificationConfig, ObservabilityConfig,
    TelegramConfig, TonConfig, TrackersConfig, WatchConfig,
};
