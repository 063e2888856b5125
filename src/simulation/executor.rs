use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{COMPLETION_POLL_INTERVAL_SECS, COMPLETION_WAIT_CEILING_SECS};

use super::driver::{StepDriver, StepOutcome};
use super::scenarios::{Scenario, Step};
use super::{PerformanceSample, ScenarioResult, StepResult, TestError, TestErrorKind, UserProfile};

/// Run one scenario for one user profile against the target.
///
/// Step failures are recorded and tolerated; the scenario always finalizes
/// into a result. Overall success means zero errors were recorded.
pub async fn run_scenario(
    driver: &dyn StepDriver,
    profile: &UserProfile,
    scenario: Scenario,
) -> ScenarioResult {
    let started_at = Utc::now();
    let mut steps: Vec<StepResult> = Vec::new();
    let mut errors: Vec<TestError> = Vec::new();

    debug!(
        "Running scenario {} for user {}",
        scenario.tag(),
        profile.id
    );

    for (i, step) in scenario.steps().iter().enumerate() {
        if i > 0 {
            sleep(think_time(profile)).await;
        }

        let result = if step.bounded_wait {
            run_wait_step(driver, profile, step, &mut errors).await
        } else {
            run_plain_step(driver, profile, step, &mut errors).await
        };

        if !result.success {
            warn!(
                "Step {} failed for user {} in {}: {}",
                step.name,
                profile.id,
                scenario.tag(),
                result.error.as_deref().unwrap_or("unknown")
            );
        }
        let terminal = step.bounded_wait && !result.success;
        steps.push(result);

        // A wait step that never completed is terminal; the remaining steps
        // depend on the job it was waiting for.
        if terminal {
            break;
        }
    }

    let performance = match driver.sample_performance(profile).await {
        Ok(sample) => sample,
        Err(e) => {
            warn!("Performance sampling failed for {}: {}", profile.id, e);
            PerformanceSample::default()
        }
    };

    let ended_at = Utc::now();
    let duration_ms = (ended_at - started_at).num_milliseconds() as f64;
    let success = errors.is_empty();

    ScenarioResult {
        user_id: profile.id.clone(),
        scenario,
        started_at,
        ended_at,
        duration_ms,
        success,
        steps,
        errors,
        performance,
    }
}

/// Run a normal step once, translating failures into recorded errors.
async fn run_plain_step(
    driver: &dyn StepDriver,
    profile: &UserProfile,
    step: &Step,
    errors: &mut Vec<TestError>,
) -> StepResult {
    match driver.run_step(profile, step.action).await {
        Ok(outcome) => {
            if let Some((kind, message)) = &outcome.error {
                errors.push(TestError {
                    kind: *kind,
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
            }
            step_result(step, &outcome)
        }
        Err(e) => {
            // Driver blew up; record one script error and keep the run alive.
            errors.push(TestError {
                kind: TestErrorKind::Script,
                message: e.to_string(),
                timestamp: Utc::now(),
            });
            StepResult {
                name: step.name.to_string(),
                success: false,
                duration_ms: 0.0,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Poll a bounded-wait step until it completes or the ceiling is reached.
/// Never completing raises exactly one timeout error.
async fn run_wait_step(
    driver: &dyn StepDriver,
    profile: &UserProfile,
    step: &Step,
    errors: &mut Vec<TestError>,
) -> StepResult {
    let ceiling = Duration::from_secs(COMPLETION_WAIT_CEILING_SECS);
    let poll = Duration::from_secs(COMPLETION_POLL_INTERVAL_SECS);
    let start = tokio::time::Instant::now();
    let mut waited_ms = 0.0;

    loop {
        match driver.run_step(profile, step.action).await {
            Ok(outcome) => {
                waited_ms += outcome.duration_ms;
                if outcome.success {
                    return step_result(step, &StepOutcome::ok(waited_ms));
                }
            }
            Err(e) => {
                errors.push(TestError {
                    kind: TestErrorKind::Script,
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                return StepResult {
                    name: step.name.to_string(),
                    success: false,
                    duration_ms: waited_ms,
                    error: Some(e.to_string()),
                };
            }
        }

        if start.elapsed() + poll > ceiling {
            let message = format!(
                "{} did not complete within {}s",
                step.action.target(),
                COMPLETION_WAIT_CEILING_SECS
            );
            errors.push(TestError {
                kind: TestErrorKind::Timeout,
                message: message.clone(),
                timestamp: Utc::now(),
            });
            return StepResult {
                name: step.name.to_string(),
                success: false,
                duration_ms: waited_ms,
                error: Some(message),
            };
        }

        sleep(poll).await;
    }
}

fn step_result(step: &Step, outcome: &StepOutcome) -> StepResult {
    StepResult {
        name: step.name.to_string(),
        success: outcome.success,
        duration_ms: outcome.duration_ms,
        error: outcome.error.as_ref().map(|(_, m)| m.clone()),
    }
}

/// Uniform pause drawn from the profile's think-time range.
fn think_time(profile: &UserProfile) -> Duration {
    let (min, max) = profile.behavior.think_time_ms;
    let ms = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    Duration::from_millis(ms)
}
