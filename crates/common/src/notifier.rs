use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use teloxide::prelude::*;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::NotifierConfig;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook answered with status {0}")]
    Status(u16),
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Outbound channel for run summaries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// POSTs `{"content": message}` to a chat webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "content": message }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.bot.send_message(self.chat_id, message).await?;
        Ok(())
    }
}

/// Used when no channel is configured; alerts are silently dropped.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotifyError> {
        debug!("No notification channel configured, alert dropped");
        Ok(())
    }
}

pub fn build_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config {
        NotifierConfig::Webhook(url) => Arc::new(WebhookNotifier::new(url.clone())),
        NotifierConfig::Telegram { token, chat_id } => Arc::new(TelegramNotifier::new(token, *chat_id)),
        NotifierConfig::Disabled => Arc::new(DisabledNotifier),
    }
}

/// Sends an alert and logs a failure instead of returning it.
pub async fn send_alert(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.send(message).await {
        error!("Failed to send alert: {}", e);
    }
}
