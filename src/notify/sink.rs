//! Notification delivery seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::watch::ChatId;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The recipient cannot be reached (blocked bot, unknown chat, ...).
    #[error("delivery rejected ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Destination for rendered notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        tracing::info!(chat_id, text, "Notification (log sink)");
        Ok(())
    }
}
