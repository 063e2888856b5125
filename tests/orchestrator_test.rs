use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use canary_supervisor::error::CanaryError;
use canary_supervisor::orchestrator::TestOrchestrator;
use canary_supervisor::simulation::driver::{StepDriver, StepOutcome};
use canary_supervisor::simulation::profiles::ProfileRegistry;
use canary_supervisor::simulation::scenarios::StepAction;
use canary_supervisor::simulation::{PerformanceSample, UserProfile};

/// Always-succeeding driver so orchestration behavior is deterministic.
struct GreenDriver;

#[async_trait]
impl StepDriver for GreenDriver {
    async fn run_step(
        &self,
        _profile: &UserProfile,
        _action: StepAction,
    ) -> anyhow::Result<StepOutcome> {
        Ok(StepOutcome::ok(5.0))
    }

    async fn sample_performance(&self, _profile: &UserProfile) -> anyhow::Result<PerformanceSample> {
        Ok(PerformanceSample::default())
    }
}

fn orchestrator() -> TestOrchestrator {
    TestOrchestrator::new(ProfileRegistry::standard(), Arc::new(GreenDriver))
}

#[tokio::test(start_paused = true)]
async fn run_all_covers_every_profile_and_scenario() {
    let registry = ProfileRegistry::standard();
    let expected: usize = registry.profiles().iter().map(|p| p.scenarios.len()).sum();

    let orch = orchestrator();
    let (_tx, rx) = watch::channel(false);
    let run = orch.run_all(rx).await.unwrap();

    assert_eq!(run.results.len(), expected);
    assert_eq!(run.by_user.len(), registry.len());
    for profile in registry.profiles() {
        let results = &run.by_user[&profile.id];
        assert_eq!(results.len(), profile.scenarios.len());
        // Assigned order is preserved.
        for (result, scenario) in results.iter().zip(profile.scenarios.iter()) {
            assert_eq!(result.scenario, *scenario);
        }
    }
    assert!(run.results.iter().all(|r| r.success));
}

#[tokio::test(start_paused = true)]
async fn concurrent_run_is_rejected() {
    let orch = Arc::new(orchestrator());
    let (_tx, rx) = watch::channel(false);

    let first = orch.run_all(rx.clone());
    let second = orch.run_all(rx);
    let (r1, r2) = tokio::join!(first, second);

    assert!(r1.is_ok());
    assert!(matches!(r2, Err(CanaryError::RunAlreadyInProgress)));
}

#[tokio::test(start_paused = true)]
async fn guard_clears_after_a_run() {
    let orch = orchestrator();
    let (_tx, rx) = watch::channel(false);

    orch.run_all(rx.clone()).await.unwrap();
    assert!(!orch.is_running());

    // A fresh run is accepted once the previous one finished.
    let again = orch.run_all(rx).await;
    assert!(again.is_ok());
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_run_early() {
    let orch = orchestrator();
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let run = orch.run_all(rx).await.unwrap();
    assert!(run.results.is_empty());
    assert!(!orch.is_running());
}
