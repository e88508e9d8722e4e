//! Slack-style incoming webhook sink. Posts `{"message": "..."}`.

use super::{NotificationError, NotificationSink};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SlackWebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackWebhookNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout_ms: u64) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| {
                NotificationError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for SlackWebhookNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(status = %status, message = message, "Sent message to notification webhook");
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "slack_webhook"
    }
}
