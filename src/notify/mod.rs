//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! WalletMonitor tick
//!     → render.rs (Notification → HTML text)
//!     → NotificationSink::send(chat_id, text)
//!         → telegram.rs (Bot API sendMessage) | LogSink
//! ```
//!
//! # Design Decisions
//! - Delivery errors are returned to the monitor, which logs and moves on
//! - Without a bot token the process still runs, logging notifications

pub mod render;
pub mod sink;
pub mod telegram;

use std::sync::Arc;

use crate::config::NotificationConfig;

pub use sink::{LogSink, NotificationSink, NotifyError};
pub use telegram::TelegramSink;

/// Pick the sink matching the configuration.
pub fn build_sink(config: &NotificationConfig) -> Result<Arc<dyn NotificationSink>, NotifyError> {
    match &config.telegram {
        Some(telegram) => {
            tracing::info!(api_url = %telegram.api_url, "Telegram notifications enabled");
            Ok(Arc::new(TelegramSink::new(telegram)?))
        }
        None => {
            tracing::warn!("No Telegram bot token configured; notifications will only be logged");
            Ok(Arc::new(LogSink))
        }
    }
}
