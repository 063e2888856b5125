use async_trait::async_trait;
use rand::Rng;

use super::scenarios::StepAction;
use super::{NetworkClass, PerformanceSample, TestErrorKind, UserProfile};

/// Outcome of one driver-executed step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub success: bool,
    pub duration_ms: f64,
    pub error: Option<(TestErrorKind, String)>,
}

impl StepOutcome {
    pub fn ok(duration_ms: f64) -> Self {
        StepOutcome {
            success: true,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(duration_ms: f64, kind: TestErrorKind, message: impl Into<String>) -> Self {
        StepOutcome {
            success: false,
            duration_ms,
            error: Some((kind, message.into())),
        }
    }
}

/// Seam between the orchestration code and whatever actually performs user
/// actions. Production wires a real automation driver here; tests and the
/// default simulation wire [`SimulatedDriver`] or a scripted mock.
#[async_trait]
pub trait StepDriver: Send + Sync {
    /// Run one named action for one user and report success/timing. An `Err`
    /// here means the driver itself blew up, not that the action failed; the
    /// executor records it as a script error and keeps going.
    async fn run_step(&self, profile: &UserProfile, action: StepAction)
        -> anyhow::Result<StepOutcome>;

    /// Gather page-level metrics, called once at scenario end.
    async fn sample_performance(&self, profile: &UserProfile) -> anyhow::Result<PerformanceSample>;
}

/// Stand-in driver that injects latency and failures statistically instead
/// of controlling a browser.
pub struct SimulatedDriver {
    pub failure_rate: f64,
    pub completion_rate: f64,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        SimulatedDriver {
            failure_rate: 0.04,
            // Per-poll chance that a simulated background job has finished.
            completion_rate: 0.6,
        }
    }
}

fn network_base_ms(network: NetworkClass) -> f64 {
    match network {
        NetworkClass::Fiber => 80.0,
        NetworkClass::Wifi => 150.0,
        NetworkClass::Cellular4g => 350.0,
        NetworkClass::Cellular3g => 900.0,
    }
}

#[async_trait]
impl StepDriver for SimulatedDriver {
    async fn run_step(
        &self,
        profile: &UserProfile,
        action: StepAction,
    ) -> anyhow::Result<StepOutcome> {
        let base = network_base_ms(profile.device.network);
        let (duration_ms, roll): (f64, f64) = {
            let mut rng = rand::thread_rng();
            (base * rng.gen_range(0.5..2.0), rng.gen())
        };
        // Tolerant users retry flaky actions themselves; the surfaced
        // failure rate shrinks with their tolerance.
        let failure_rate = self.failure_rate * (1.0 - profile.behavior.error_tolerance);

        let outcome = match action {
            StepAction::PollCompletion(target) => {
                if roll < self.completion_rate {
                    StepOutcome::ok(duration_ms)
                } else {
                    StepOutcome::failed(
                        duration_ms,
                        TestErrorKind::Timeout,
                        format!("{} not complete yet", target),
                    )
                }
            }
            StepAction::Navigate(target) => {
                if roll < failure_rate {
                    StepOutcome::failed(
                        duration_ms,
                        TestErrorKind::Network,
                        format!("navigation to {} failed", target),
                    )
                } else {
                    StepOutcome::ok(duration_ms)
                }
            }
            StepAction::Assert(target) => {
                if roll < failure_rate {
                    StepOutcome::failed(
                        duration_ms,
                        TestErrorKind::Assertion,
                        format!("{} not found", target),
                    )
                } else {
                    StepOutcome::ok(duration_ms)
                }
            }
            StepAction::Click(target) | StepAction::Type(target) => {
                if roll < failure_rate {
                    StepOutcome::failed(
                        duration_ms,
                        TestErrorKind::Script,
                        format!("action on {} threw", target),
                    )
                } else {
                    StepOutcome::ok(duration_ms)
                }
            }
        };
        Ok(outcome)
    }

    async fn sample_performance(&self, profile: &UserProfile) -> anyhow::Result<PerformanceSample> {
        let base = network_base_ms(profile.device.network);
        let mut rng = rand::thread_rng();
        let page_load = base * rng.gen_range(3.0..8.0);
        Ok(PerformanceSample {
            page_load_ms: page_load,
            first_paint_ms: page_load * rng.gen_range(0.2..0.4),
            largest_paint_ms: page_load * rng.gen_range(0.5..0.9),
            interaction_latency_ms: base * rng.gen_range(0.1..0.5),
            layout_shift_score: rng.gen_range(0.0..0.15),
            network_requests: rng.gen_range(10..60),
            bytes_transferred: rng.gen_range(200_000..3_000_000),
        })
    }
}
