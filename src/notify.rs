use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::{CanaryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutNotification {
    pub status: NotificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Final success/failure summary sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: RolloutNotification) -> Result<()>;
}

/// Fallback sink when no webhook is configured: log and move on.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: RolloutNotification) -> Result<()> {
        match notification.status {
            NotificationStatus::Success => info!(
                "Rollout succeeded at {}%",
                notification.final_percentage.unwrap_or(0)
            ),
            NotificationStatus::Failed => error!(
                "Rollout failed: {}",
                notification.error_message.as_deref().unwrap_or("unknown")
            ),
        }
        Ok(())
    }
}

/// POSTs the notification JSON to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        WebhookNotifier {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn notify(&self, notification: RolloutNotification) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(&notification)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(CanaryError::Notification(format!(
                "webhook returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Test double that records every notification it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub received: Mutex<Vec<RolloutNotification>>,
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: RolloutNotification) -> Result<()> {
        self.received.lock().await.push(notification);
        Ok(())
    }
}
