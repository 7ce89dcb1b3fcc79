//! Telegram Bot API delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TelegramConfig;
use crate::notify::sink::{NotificationSink, NotifyError};
use crate::watch::ChatId;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends HTML messages through `sendMessage`.
pub struct TelegramSink {
    http: reqwest::Client,
    endpoint: String,
}

impl TelegramSink {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
                disable_web_page_preview: true,
            })
            .send()
            .await?;

        let status = response.status();
        // Telegram answers errors with a JSON body too; fall back to the
        // status line if it is missing.
        let body: Option<ApiResponse> = response.json().await.ok();
        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| status.to_string()),
            }),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: status.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for TelegramSink {
    // The endpoint embeds the bot token.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink").finish_non_exhaustive()
    }
}
