use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{HEALTH_POLL_INTERVAL_SECS, HEALTH_SCORE_FLOOR};
use crate::error::{CanaryError, Result};
use crate::flags::FlagService;
use crate::health::HealthProbe;
use crate::notify::{NotificationSink, NotificationStatus, RolloutNotification};

use super::{select_strategy, RolloutState, StrategyName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutOutcome {
    Completed { final_percentage: u8 },
    RolledBack { reason: String },
}

/// Walks a rollout ladder: applies each percentage step to every target
/// flag, watches health during the step's monitoring window, and aborts to
/// zero exposure on any breach, apply failure, or cancellation.
pub struct RolloutController {
    flags: Arc<dyn FlagService>,
    health: Arc<dyn HealthProbe>,
    notifier: Arc<dyn NotificationSink>,
    flag_keys: Vec<String>,
    state: RwLock<RolloutState>,
    in_flight: Mutex<()>,
}

impl RolloutController {
    pub fn new(
        flags: Arc<dyn FlagService>,
        health: Arc<dyn HealthProbe>,
        notifier: Arc<dyn NotificationSink>,
        flag_keys: Vec<String>,
    ) -> Self {
        RolloutController {
            flags,
            health,
            notifier,
            flag_keys,
            state: RwLock::new(RolloutState::new()),
            in_flight: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> RolloutState {
        self.state.read().await.clone()
    }

    /// Execute the ladder selected for (score, requested strategy).
    ///
    /// Only one rollout may run per controller; a second call while one is
    /// in flight is rejected rather than queued.
    pub async fn execute(
        &self,
        score: u8,
        requested: StrategyName,
        cancel: watch::Receiver<bool>,
    ) -> Result<RolloutOutcome> {
        let _lock = self
            .in_flight
            .try_lock()
            .map_err(|_| CanaryError::RolloutAlreadyInProgress)?;

        let (selected, ladder) = select_strategy(score, requested);
        if selected != requested {
            warn!(
                "Score {} does not qualify for {:?} strategy, using {:?}",
                score, requested, selected
            );
        }
        info!(
            "Starting {:?} rollout: {} steps, flags: {:?}",
            selected,
            ladder.len(),
            self.flag_keys
        );

        for (i, step) in ladder.iter().enumerate() {
            info!(
                "Rollout step {}/{}: {}% (monitor {}s)",
                i + 1,
                ladder.len(),
                step.percentage,
                step.monitor_for.as_secs()
            );

            if let Err(e) = self.apply_percentage(step.percentage).await {
                error!("Failed to apply step {}: {}", i + 1, e);
                return self.roll_back(format!("flag update failed: {}", e)).await;
            }
            self.state.write().await.advance(i, step.percentage);

            if step.monitor_for.is_zero() {
                continue;
            }

            if let Some(reason) = self.monitor_step(step.monitor_for, &cancel).await? {
                return self.roll_back(reason).await;
            }
        }

        self.state.write().await.complete();
        let final_percentage = self.state.read().await.percentage;
        info!("Rollout completed at {}%", final_percentage);
        self.try_notify(RolloutNotification {
            status: NotificationStatus::Success,
            final_percentage: Some(final_percentage),
            error_message: None,
        })
        .await;

        Ok(RolloutOutcome::Completed { final_percentage })
    }

    /// Poll health at the fixed cadence for the whole monitoring window.
    /// Returns the abort reason when the step must be rolled back.
    async fn monitor_step(
        &self,
        window: Duration,
        cancel: &watch::Receiver<bool>,
    ) -> Result<Option<String>> {
        let cadence = Duration::from_secs(HEALTH_POLL_INTERVAL_SECS);
        let start = tokio::time::Instant::now();

        loop {
            // Cancellation wins over the next poll.
            if *cancel.borrow() {
                return Ok(Some("rollout cancelled by operator".to_string()));
            }

            let health = match self.health.sample().await {
                Ok(h) => h,
                Err(e) => return Ok(Some(format!("health probe failed: {}", e))),
            };
            if health < HEALTH_SCORE_FLOOR {
                return Ok(Some(format!(
                    "health score {:.1} below floor {:.1}",
                    health, HEALTH_SCORE_FLOOR
                )));
            }

            let elapsed = start.elapsed();
            if elapsed >= window {
                return Ok(None);
            }
            sleep(cadence.min(window - elapsed)).await;
        }
    }

    async fn apply_percentage(&self, percentage: u8) -> Result<()> {
        for key in &self.flag_keys {
            self.flags.set_rollout_percentage(key, percentage).await?;
        }
        Ok(())
    }

    /// Operator-facing emergency stop: zero every flag and notify, whatever
    /// the current state is.
    pub async fn emergency_roll_back(&self, reason: String) -> Result<RolloutOutcome> {
        self.roll_back(reason).await
    }

    /// Emergency exit: zero every flag, mark the state, notify failure.
    async fn roll_back(&self, reason: String) -> Result<RolloutOutcome> {
        error!("Rolling back: {}", reason);
        for key in &self.flag_keys {
            if let Err(e) = self.flags.set_rollout_percentage(key, 0).await {
                // Keep zeroing the rest; one stuck flag must not stop the others.
                error!("Failed to zero flag {} during rollback: {}", key, e);
            }
        }
        self.state.write().await.roll_back();
        self.try_notify(RolloutNotification {
            status: NotificationStatus::Failed,
            final_percentage: Some(0),
            error_message: Some(reason.clone()),
        })
        .await;

        Ok(RolloutOutcome::RolledBack { reason })
    }

    async fn try_notify(&self, notification: RolloutNotification) {
        if let Err(e) = self.notifier.notify(notification).await {
            warn!("Notification failed: {}", e);
        }
    }
}
