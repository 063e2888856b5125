use async_trait::async_trait;

use canary_supervisor::simulation::driver::{SimulatedDriver, StepDriver, StepOutcome};
use canary_supervisor::simulation::executor::run_scenario;
use canary_supervisor::simulation::scenarios::{Scenario, StepAction};
use canary_supervisor::simulation::{
    Archetype, BehaviorPattern, DeviceClass, DeviceProfile, NetworkClass, PerformanceSample,
    TestErrorKind, UserProfile,
};

fn profile() -> UserProfile {
    UserProfile {
        id: "test-user".to_string(),
        archetype: Archetype::Casual,
        behavior: BehaviorPattern {
            session_duration_ms: (1_000, 2_000),
            actions_per_session: (1, 5),
            think_time_ms: (0, 0),
            error_tolerance: 0.5,
            feature_adoption: 0.5,
        },
        device: DeviceProfile {
            viewport: (1920, 1080),
            network: NetworkClass::Wifi,
            device: DeviceClass::Desktop,
            touch: false,
            screen_reader: false,
        },
        preferences: vec![],
        scenarios: vec![],
    }
}

/// Driver scripted by step target: listed targets fail or error, wait
/// targets never complete unless allowed.
struct ScriptedDriver {
    fail_target: Option<&'static str>,
    error_target: Option<&'static str>,
    complete_waits: bool,
}

impl ScriptedDriver {
    fn all_ok() -> Self {
        ScriptedDriver {
            fail_target: None,
            error_target: None,
            complete_waits: true,
        }
    }
}

#[async_trait]
impl StepDriver for ScriptedDriver {
    async fn run_step(
        &self,
        _profile: &UserProfile,
        action: StepAction,
    ) -> anyhow::Result<StepOutcome> {
        let target = action.target();
        if self.error_target == Some(target) {
            anyhow::bail!("driver exploded on {}", target);
        }
        if self.fail_target == Some(target) {
            return Ok(StepOutcome::failed(
                10.0,
                TestErrorKind::Assertion,
                format!("{} missing", target),
            ));
        }
        if let StepAction::PollCompletion(_) = action {
            if !self.complete_waits {
                return Ok(StepOutcome::failed(10.0, TestErrorKind::Timeout, "pending"));
            }
        }
        Ok(StepOutcome::ok(10.0))
    }

    async fn sample_performance(&self, _profile: &UserProfile) -> anyhow::Result<PerformanceSample> {
        Ok(PerformanceSample::default())
    }
}

#[tokio::test(start_paused = true)]
async fn clean_run_succeeds_with_all_steps() {
    let driver = ScriptedDriver::all_ok();
    let result = run_scenario(&driver, &profile(), Scenario::BrowseLibrary).await;

    assert!(result.success);
    assert!(result.errors.is_empty());
    assert_eq!(result.steps.len(), Scenario::BrowseLibrary.steps().len());
    assert!(result.steps.iter().all(|s| s.success));
    assert!(result.duration_ms >= 0.0);
}

#[tokio::test(start_paused = true)]
async fn failed_step_is_recorded_but_does_not_abort() {
    let driver = ScriptedDriver {
        fail_target: Some("load-more"),
        error_target: None,
        complete_waits: true,
    };
    let result = run_scenario(&driver, &profile(), Scenario::BrowseLibrary).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, TestErrorKind::Assertion);
    // Every step still ran after the failure.
    assert_eq!(result.steps.len(), Scenario::BrowseLibrary.steps().len());
}

#[tokio::test(start_paused = true)]
async fn driver_error_becomes_script_error_and_run_finalizes() {
    let driver = ScriptedDriver {
        fail_target: None,
        error_target: Some("search-box"),
        complete_waits: true,
    };
    let result = run_scenario(&driver, &profile(), Scenario::SearchDiscover).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, TestErrorKind::Script);
    assert!(result.errors[0].message.contains("driver exploded"));
    assert_eq!(result.steps.len(), Scenario::SearchDiscover.steps().len());
}

#[tokio::test(start_paused = true)]
async fn stuck_wait_step_raises_one_timeout_error() {
    let driver = ScriptedDriver {
        fail_target: None,
        error_target: None,
        complete_waits: false,
    };
    let result = run_scenario(&driver, &profile(), Scenario::Playback).await;

    assert!(!result.success);
    let timeouts: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.kind == TestErrorKind::Timeout)
        .collect();
    assert_eq!(timeouts.len(), 1);
    assert!(timeouts[0].message.contains("did not complete"));

    // The timed-out wait is terminal: nothing after it runs.
    assert_eq!(result.steps.last().unwrap().name, "wait-buffering");
    assert!(!result.steps.last().unwrap().success);
    assert_eq!(result.steps.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn error_tolerance_scales_simulated_failures() {
    let driver = SimulatedDriver {
        failure_rate: 1.0,
        completion_rate: 1.0,
    };

    let mut tolerant = profile();
    tolerant.behavior.error_tolerance = 1.0;
    for _ in 0..25 {
        let outcome = driver
            .run_step(&tolerant, StepAction::Click("save-settings"))
            .await
            .unwrap();
        assert!(outcome.success);
    }

    let mut intolerant = profile();
    intolerant.behavior.error_tolerance = 0.0;
    for _ in 0..25 {
        let outcome = driver
            .run_step(&intolerant, StepAction::Click("save-settings"))
            .await
            .unwrap();
        assert!(!outcome.success);
    }
}

#[tokio::test(start_paused = true)]
async fn duration_matches_timestamps() {
    let driver = ScriptedDriver::all_ok();
    let result = run_scenario(&driver, &profile(), Scenario::SettingsUpdate).await;

    let from_timestamps = (result.ended_at - result.started_at).num_milliseconds() as f64;
    assert_eq!(result.duration_ms, from_timestamps);
}
