use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::BETWEEN_PROFILES_DELAY_MS;
use crate::error::{CanaryError, Result};
use crate::simulation::driver::StepDriver;
use crate::simulation::executor::run_scenario;
use crate::simulation::profiles::ProfileRegistry;
use crate::simulation::ScenarioResult;

/// Everything one canary test run produced.
pub struct RunOutcome {
    pub run_id: String,
    pub results: Vec<ScenarioResult>,
    pub by_user: HashMap<String, Vec<ScenarioResult>>,
    pub duration: Duration,
}

/// Drives every registered profile through its assigned scenarios,
/// sequentially, with a single-flight guard against overlapping runs.
pub struct TestOrchestrator {
    registry: ProfileRegistry,
    driver: Arc<dyn StepDriver>,
    running: AtomicBool,
}

/// Clears the single-flight flag on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TestOrchestrator {
    pub fn new(registry: ProfileRegistry, driver: Arc<dyn StepDriver>) -> Self {
        TestOrchestrator {
            registry,
            driver,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run every profile x scenario pair in order and collect the results.
    ///
    /// Rejects immediately if a run is already in flight. The guard is
    /// released on all paths, including cancellation.
    pub async fn run_all(&self, stop_rx: watch::Receiver<bool>) -> Result<RunOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CanaryError::RunAlreadyInProgress);
        }
        let _guard = RunningGuard(&self.running);

        let run_id = uuid::Uuid::new_v4().to_string();
        let start = tokio::time::Instant::now();
        let mut results: Vec<ScenarioResult> = Vec::new();

        info!(
            "Test run {} started: {} profiles",
            run_id,
            self.registry.len()
        );

        'profiles: for (i, profile) in self.registry.profiles().iter().enumerate() {
            if i > 0 {
                sleep(Duration::from_millis(BETWEEN_PROFILES_DELAY_MS)).await;
            }

            for scenario in &profile.scenarios {
                if *stop_rx.borrow() {
                    warn!("Test run {} cancelled", run_id);
                    break 'profiles;
                }

                let result = run_scenario(self.driver.as_ref(), profile, *scenario).await;
                info!(
                    "  {} / {} — {} ({} errors, {:.0}ms)",
                    profile.id,
                    scenario.tag(),
                    if result.success { "ok" } else { "failed" },
                    result.errors.len(),
                    result.duration_ms
                );
                results.push(result);
            }
        }

        let duration = start.elapsed();
        let mut by_user: HashMap<String, Vec<ScenarioResult>> = HashMap::new();
        for result in &results {
            by_user
                .entry(result.user_id.clone())
                .or_default()
                .push(result.clone());
        }

        info!(
            "Test run {} finished: {} results in {:.1}s",
            run_id,
            results.len(),
            duration.as_secs_f64()
        );

        Ok(RunOutcome {
            run_id,
            results,
            by_user,
            duration,
        })
    }
}
