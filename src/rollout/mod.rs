pub mod controller;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{StrategyArg, AGGRESSIVE_MIN_SCORE, INSTANT_MIN_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    Conservative,
    Aggressive,
    Instant,
}

impl From<StrategyArg> for StrategyName {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Conservative => StrategyName::Conservative,
            StrategyArg::Aggressive => StrategyName::Aggressive,
            StrategyArg::Instant => StrategyName::Instant,
        }
    }
}

/// One rung of a rollout ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutStep {
    pub percentage: u8,
    /// Zero means apply-and-advance with no health monitoring (the terminal
    /// 100% rung).
    pub monitor_for: Duration,
    pub watch_metrics: Vec<String>,
}

impl RolloutStep {
    fn new(percentage: u8, monitor_mins: u64, metrics: &[&str]) -> Self {
        RolloutStep {
            percentage,
            monitor_for: Duration::from_secs(monitor_mins * 60),
            watch_metrics: metrics.iter().map(|m| m.to_string()).collect(),
        }
    }
}

const CORE_METRICS: &[&str] = &["error_rate", "latency_p95", "health_score"];
const WIDE_METRICS: &[&str] = &["error_rate", "latency_p95", "health_score", "saturation"];

fn conservative_ladder() -> Vec<RolloutStep> {
    vec![
        RolloutStep::new(5, 15, CORE_METRICS),
        RolloutStep::new(10, 15, CORE_METRICS),
        RolloutStep::new(25, 30, WIDE_METRICS),
        RolloutStep::new(50, 30, WIDE_METRICS),
        RolloutStep::new(100, 0, &[]),
    ]
}

fn aggressive_ladder() -> Vec<RolloutStep> {
    vec![
        RolloutStep::new(10, 10, CORE_METRICS),
        RolloutStep::new(50, 15, WIDE_METRICS),
        RolloutStep::new(100, 0, &[]),
    ]
}

fn instant_ladder() -> Vec<RolloutStep> {
    vec![RolloutStep::new(100, 0, &[])]
}

/// Total decision table from (score, requested strategy) to the ladder that
/// actually runs. Fast strategies require a qualifying score and otherwise
/// fall back to conservative.
pub fn select_strategy(score: u8, requested: StrategyName) -> (StrategyName, Vec<RolloutStep>) {
    match requested {
        StrategyName::Instant if score >= INSTANT_MIN_SCORE => {
            (StrategyName::Instant, instant_ladder())
        }
        StrategyName::Aggressive if score >= AGGRESSIVE_MIN_SCORE => {
            (StrategyName::Aggressive, aggressive_ladder())
        }
        _ => (StrategyName::Conservative, conservative_ladder()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolloutStatus {
    Testing,
    RollingOut,
    Completed,
    Failed,
    RolledBack,
}

/// Mutable rollout progress. Percentage only grows during normal advance
/// and resets to zero exclusively through the rollback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutState {
    pub step_index: usize,
    pub percentage: u8,
    pub status: RolloutStatus,
    pub updated_at: DateTime<Utc>,
}

impl RolloutState {
    pub fn new() -> Self {
        RolloutState {
            step_index: 0,
            percentage: 0,
            status: RolloutStatus::Testing,
            updated_at: Utc::now(),
        }
    }

    pub fn advance(&mut self, step_index: usize, percentage: u8) {
        debug_assert!(percentage >= self.percentage);
        self.step_index = step_index;
        self.percentage = percentage;
        self.status = RolloutStatus::RollingOut;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = RolloutStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn roll_back(&mut self) {
        self.percentage = 0;
        self.status = RolloutStatus::RolledBack;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self) {
        self.status = RolloutStatus::Failed;
        self.updated_at = Utc::now();
    }
}

impl Default for RolloutState {
    fn default() -> Self {
        Self::new()
    }
}
