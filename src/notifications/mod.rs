//! # Notification Sink
//!
//! Fire-and-forget side channel for human-readable status messages.
//! Delivery never affects task status: [`dispatch`] spawns the send, logs a
//! failure, and returns immediately.

pub mod slack;

pub use slack::SlackWebhookNotifier;

use crate::config::NotificationsConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Notification rejected: HTTP {status}")]
    Rejected { status: u16 },

    #[error("Notification configuration error: {0}")]
    ConfigError(String),
}

/// Destination for status messages
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotificationError>;

    fn sink_name(&self) -> &'static str;
}

/// Sink used when notifications are disabled
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl NotificationSink for NoOpNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        debug!(message = message, "Notification dropped (notifications disabled)");
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "noop"
    }
}

/// Send `message` in the background. The caller never waits on delivery.
pub fn dispatch(sink: Arc<dyn NotificationSink>, message: String) {
    tokio::spawn(async move {
        if let Err(e) = sink.send(&message).await {
            warn!(sink = sink.sink_name(), error = %e, "Failed to deliver notification");
        }
    });
}

/// Build the configured sink
pub fn from_config(
    config: &NotificationsConfig,
) -> Result<Arc<dyn NotificationSink>, NotificationError> {
    match (config.enabled, config.webhook_url.as_deref()) {
        (true, Some(url)) => {
            let notifier = SlackWebhookNotifier::new(url, config.timeout_ms)?;
            info!("Webhook notifications enabled");
            Ok(Arc::new(notifier))
        }
        (true, None) => Err(NotificationError::ConfigError(
            "notifications.enabled requires notifications.webhook_url".to_string(),
        )),
        (false, _) => Ok(Arc::new(NoOpNotifier)),
    }
}
