pub mod driver;
pub mod executor;
pub mod profiles;
pub mod scenarios;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use self::scenarios::Scenario;

// ============================================================================
// Data model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Power,
    Casual,
    Creator,
    Mobile,
    Accessibility,
}

/// Timing and risk envelope for one synthetic user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPattern {
    pub session_duration_ms: (u64, u64),
    pub actions_per_session: (u32, u32),
    pub think_time_ms: (u64, u64),
    /// Probability (0-1) that the user tolerates a failed action and retries.
    pub error_tolerance: f64,
    /// Propensity (0-1) to exercise newly flagged features.
    pub feature_adoption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkClass {
    Fiber,
    Wifi,
    Cellular4g,
    Cellular3g,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Desktop,
    Laptop,
    Tablet,
    Phone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub viewport: (u32, u32),
    pub network: NetworkClass,
    pub device: DeviceClass,
    pub touch: bool,
    pub screen_reader: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub archetype: Archetype,
    pub behavior: BehaviorPattern,
    pub device: DeviceProfile,
    /// Free-form preference toggles (theme, autoplay, etc.).
    pub preferences: Vec<(String, String)>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestErrorKind {
    Script,
    Network,
    Assertion,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestError {
    pub kind: TestErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Page-level metrics gathered once at scenario end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub page_load_ms: f64,
    pub first_paint_ms: f64,
    pub largest_paint_ms: f64,
    pub interaction_latency_ms: f64,
    pub layout_shift_score: f64,
    pub network_requests: u32,
    pub bytes_transferred: u64,
}

/// One (profile, scenario) execution. Immutable after the executor builds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub user_id: String,
    pub scenario: Scenario,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: f64,
    pub success: bool,
    pub steps: Vec<StepResult>,
    pub errors: Vec<TestError>,
    pub performance: PerformanceSample,
}
