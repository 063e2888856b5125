use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Canary Supervisor — validates a deployment with simulated user sessions
/// and progressively rolls a feature out to real traffic.
#[derive(Parser, Debug, Clone)]
#[command(name = "canary-supervisor")]
pub struct CliArgs {
    /// Deployment URL under test
    #[arg(short = 'u', long = "deployment-url")]
    pub deployment_url: String,

    /// Skip the simulation run and use this score (0-100) directly
    #[arg(short = 's', long = "score")]
    pub score: Option<u8>,

    /// Branch or change label for context in logs and notifications
    #[arg(short = 'b', long = "branch", default_value = "main")]
    pub branch: String,

    /// Rollout strategy
    #[arg(long = "strategy", value_enum, default_value = "conservative")]
    pub strategy: StrategyArg,

    /// Feature flag key to roll out (repeatable)
    #[arg(short = 'f', long = "flag")]
    pub flags: Vec<String>,

    /// Feature-flag service base URL (in-memory simulation when omitted)
    #[arg(long = "flag-api")]
    pub flag_api: Option<String>,

    /// Health score endpoint polled during rollout monitoring
    #[arg(long = "health-url")]
    pub health_url: Option<String>,

    /// Webhook for the final success/failure notification
    #[arg(long = "notify-url")]
    pub notify_url: Option<String>,

    /// Write the CI report JSON to this path in addition to stdout
    #[arg(long = "report-json")]
    pub report_json: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Conservative,
    Aggressive,
    Instant,
}

pub struct CanaryConfig {
    pub deployment_url: String,
    pub score_override: Option<u8>,
    pub branch: String,
    pub strategy: StrategyArg,
    pub flags: Vec<String>,
    pub flag_api: Option<String>,
    pub health_url: Option<String>,
    pub notify_url: Option<String>,
    pub report_json: Option<PathBuf>,
}

// Validation constants
/// Minimum validation score (0-100) for a canary to be approved.
pub const PASS_SCORE_THRESHOLD: u8 = 80;

// Rollout constants
/// Health score floor during monitoring. Independent tunable from
/// PASS_SCORE_THRESHOLD even though the values currently coincide.
pub const HEALTH_SCORE_FLOOR: f64 = 80.0;
pub const HEALTH_POLL_INTERVAL_SECS: u64 = 30;
pub const INSTANT_MIN_SCORE: u8 = 98;
pub const AGGRESSIVE_MIN_SCORE: u8 = 95;

// Executor constants
pub const COMPLETION_WAIT_CEILING_SECS: u64 = 60;
pub const COMPLETION_POLL_INTERVAL_SECS: u64 = 2;

// Orchestrator constants
pub const BETWEEN_PROFILES_DELAY_MS: u64 = 1_000;

// Alerting constants
pub const ALERT_MIN_SUCCESS_RATE: f64 = 0.95;
pub const ALERT_CRITICAL_SUCCESS_RATE: f64 = 0.80;
pub const ALERT_MAX_AVG_DURATION_MS: f64 = 30_000.0;
pub const ALERT_CRITICAL_AVG_DURATION_MS: f64 = 60_000.0;
pub const ALERT_MAX_ERROR_RATE: f64 = 0.10;
pub const ALERT_CRITICAL_ERROR_RATE: f64 = 0.20;
pub const ALERT_DEDUP_WINDOW_SECS: i64 = 300;
pub const ALERT_RETENTION: usize = 50;

impl CanaryConfig {
    pub fn from_args(args: CliArgs) -> Self {
        CanaryConfig {
            deployment_url: args.deployment_url,
            score_override: args.score,
            branch: args.branch,
            strategy: args.strategy,
            flags: args.flags,
            flag_api: args.flag_api,
            health_url: args.health_url,
            notify_url: args.notify_url,
            report_json: args.report_json,
        }
    }
}
