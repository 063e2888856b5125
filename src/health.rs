use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::error::{CanaryError, Result};

/// Synthetic 0-100 health signal sampled during rollout monitoring windows.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn sample(&self) -> Result<f64>;
}

/// Probe returning a fixed score. Simulation default and test double.
pub struct StaticHealthProbe {
    score: f64,
}

impl StaticHealthProbe {
    pub fn new(score: f64) -> Self {
        StaticHealthProbe { score }
    }
}

#[async_trait]
impl HealthProbe for StaticHealthProbe {
    async fn sample(&self) -> Result<f64> {
        Ok(self.score)
    }
}

/// Probe that replays a fixed score sequence, then repeats the last entry.
/// Lets tests script a mid-rollout degradation.
pub struct ScriptedHealthProbe {
    scores: Vec<f64>,
    next: AtomicUsize,
}

impl ScriptedHealthProbe {
    pub fn new(scores: Vec<f64>) -> Self {
        ScriptedHealthProbe {
            scores,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HealthProbe for ScriptedHealthProbe {
    async fn sample(&self) -> Result<f64> {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let score = self
            .scores
            .get(i)
            .or_else(|| self.scores.last())
            .copied()
            .ok_or_else(|| CanaryError::HealthProbe("no scripted scores".to_string()))?;
        debug!("Health sample #{}: {:.1}", i, score);
        Ok(score)
    }
}

/// HTTP probe against a deployment's health endpoint.
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct HealthBody {
    score: f64,
}

impl HttpHealthProbe {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        HttpHealthProbe {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn sample(&self) -> Result<f64> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(CanaryError::HealthProbe(format!(
                "health endpoint returned {}",
                resp.status()
            )));
        }
        let body: HealthBody = resp.json().await?;
        Ok(body.score)
    }
}
