use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CanaryError, Result};

/// Feature-flag service at its wire interface. Percentages are integers in
/// [0, 100]. No retries at this layer; failures escalate to the caller.
#[async_trait]
pub trait FlagService: Send + Sync {
    async fn set_rollout_percentage(&self, key: &str, percentage: u8) -> Result<()>;
    async fn rollout_percentage(&self, key: &str) -> Result<u8>;
}

fn check_percentage(percentage: u8) -> Result<()> {
    if percentage > 100 {
        return Err(CanaryError::FlagService(format!(
            "percentage {} out of range",
            percentage
        )));
    }
    Ok(())
}

/// In-process flag store for simulation and tests. Records every write so
/// assertions can inspect the applied percentage sequence.
#[derive(Default)]
pub struct InMemoryFlagService {
    flags: RwLock<HashMap<String, u8>>,
    history: RwLock<Vec<(String, u8)>>,
}

impl InMemoryFlagService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self) -> Vec<(String, u8)> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl FlagService for InMemoryFlagService {
    async fn set_rollout_percentage(&self, key: &str, percentage: u8) -> Result<()> {
        check_percentage(percentage)?;
        self.flags
            .write()
            .await
            .insert(key.to_string(), percentage);
        self.history
            .write()
            .await
            .push((key.to_string(), percentage));
        debug!("Flag {} set to {}%", key, percentage);
        Ok(())
    }

    async fn rollout_percentage(&self, key: &str) -> Result<u8> {
        Ok(*self.flags.read().await.get(key).unwrap_or(&0))
    }
}

/// HTTP client for a real flag service.
pub struct HttpFlagService {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PercentageBody {
    percentage: u8,
}

impl HttpFlagService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpFlagService {
            client,
            base_url: base_url.into(),
        }
    }

    fn flag_url(&self, key: &str) -> String {
        format!("{}/flags/{}/rollout", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl FlagService for HttpFlagService {
    async fn set_rollout_percentage(&self, key: &str, percentage: u8) -> Result<()> {
        check_percentage(percentage)?;
        let resp = self
            .client
            .put(self.flag_url(key))
            .json(&serde_json::json!({ "percentage": percentage }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(CanaryError::FlagService(format!(
                "set {} returned {}",
                key,
                resp.status()
            )));
        }
        Ok(())
    }

    async fn rollout_percentage(&self, key: &str) -> Result<u8> {
        let resp = self.client.get(self.flag_url(key)).send().await?;
        if !resp.status().is_success() {
            return Err(CanaryError::FlagService(format!(
                "get {} returned {}",
                key,
                resp.status()
            )));
        }
        let body: PercentageBody = resp.json().await?;
        Ok(body.percentage)
    }
}
