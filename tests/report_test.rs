use chrono::Utc;

use canary_supervisor::report::aggregate;
use canary_supervisor::simulation::scenarios::Scenario;
use canary_supervisor::simulation::{PerformanceSample, ScenarioResult};

fn result(user: &str, scenario: Scenario, success: bool, duration_ms: f64) -> ScenarioResult {
    let now = Utc::now();
    ScenarioResult {
        user_id: user.to_string(),
        scenario,
        started_at: now,
        ended_at: now,
        duration_ms,
        success,
        steps: vec![],
        errors: vec![],
        performance: PerformanceSample::default(),
    }
}

#[test]
fn empty_input_yields_zeroed_report() {
    let report = aggregate(&[]);
    assert_eq!(report.summary.total_tests, 0);
    assert_eq!(report.summary.success_rate, 0.0);
    assert_eq!(report.summary.avg_duration_ms, 0.0);
    assert!(report.scenario_breakdown.is_empty());
    assert!(report.user_breakdown.is_empty());
}

#[test]
fn success_rate_is_successes_over_total() {
    let results = vec![
        result("u1", Scenario::BrowseLibrary, true, 1000.0),
        result("u1", Scenario::Playback, true, 2000.0),
        result("u2", Scenario::BrowseLibrary, false, 3000.0),
        result("u2", Scenario::SearchDiscover, true, 4000.0),
    ];
    let report = aggregate(&results);

    assert_eq!(report.summary.total_tests, 4);
    assert_eq!(report.summary.successful_tests, 3);
    assert_eq!(report.summary.failed_tests, 1);
    assert!((report.summary.success_rate - 0.75).abs() < f64::EPSILON);
    assert!((report.summary.avg_duration_ms - 2500.0).abs() < f64::EPSILON);
    assert!(report.summary.success_rate >= 0.0 && report.summary.success_rate <= 1.0);
}

#[test]
fn breakdowns_group_by_scenario_and_user() {
    let results = vec![
        result("u1", Scenario::BrowseLibrary, true, 100.0),
        result("u2", Scenario::BrowseLibrary, false, 100.0),
        result("u2", Scenario::Playback, true, 100.0),
    ];
    let report = aggregate(&results);

    let browse = &report.scenario_breakdown["browse-library"];
    assert_eq!(browse.total, 2);
    assert_eq!(browse.successes, 1);
    let playback = &report.scenario_breakdown["playback"];
    assert_eq!(playback.total, 1);
    assert_eq!(playback.successes, 1);

    let u2 = &report.user_breakdown["u2"];
    assert_eq!(u2.total, 2);
    assert_eq!(u2.successes, 1);
}

#[test]
fn recompute_on_grown_list_matches_full_recompute() {
    let mut results = vec![result("u1", Scenario::BrowseLibrary, true, 500.0)];
    let first = aggregate(&results);
    assert_eq!(first.summary.total_tests, 1);

    results.push(result("u1", Scenario::Playback, false, 1500.0));
    let second = aggregate(&results);
    assert_eq!(second.summary.total_tests, 2);
    assert!((second.summary.success_rate - 0.5).abs() < f64::EPSILON);
    assert!((second.summary.avg_duration_ms - 1000.0).abs() < f64::EPSILON);
}
