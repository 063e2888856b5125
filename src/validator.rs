use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::config::PASS_SCORE_THRESHOLD;
use crate::error::{CanaryError, Result};
use crate::report::TestReport;
use crate::simulation::scenarios::Scenario;

// Criterion names as they appear in ValidationResult details.
pub const CRITERION_SUCCESS_RATE: &str = "success_rate";
pub const CRITERION_ERROR_RATE: &str = "error_rate";
pub const CRITERION_AVG_RESPONSE_TIME: &str = "avg_response_time";
pub const CRITERION_TEST_DURATION: &str = "test_duration";
pub const CRITERION_REQUIRED_SCENARIOS: &str = "required_scenarios";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCriteria {
    pub min_success_rate: f64,
    pub max_error_rate: f64,
    pub max_avg_response_time_ms: f64,
    pub min_test_duration: Duration,
    pub required_scenarios: Vec<Scenario>,
    /// Scenarios treated as release-blocking in reporting.
    pub critical_paths: Vec<Scenario>,
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        ValidationCriteria {
            min_success_rate: 0.95,
            max_error_rate: 0.05,
            max_avg_response_time_ms: 5_000.0,
            min_test_duration: Duration::from_secs(30),
            required_scenarios: vec![
                Scenario::CreateContent,
                Scenario::BrowseLibrary,
                Scenario::SearchDiscover,
            ],
            critical_paths: vec![Scenario::CreateContent, Scenario::Playback],
        }
    }
}

impl ValidationCriteria {
    /// Reject malformed criteria before any test runs.
    pub fn validate_config(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(CanaryError::InvalidCriteria(format!(
                "min_success_rate must be in [0,1], got {}",
                self.min_success_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.max_error_rate) {
            return Err(CanaryError::InvalidCriteria(format!(
                "max_error_rate must be in [0,1], got {}",
                self.max_error_rate
            )));
        }
        if self.max_avg_response_time_ms <= 0.0 {
            return Err(CanaryError::InvalidCriteria(
                "max_avg_response_time_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionOutcome {
    pub name: String,
    pub passed: bool,
    pub observed: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    /// Percentage of satisfied criteria, rounded to the nearest integer.
    pub score: u8,
    pub criteria: Vec<CriterionOutcome>,
    pub summary: String,
}

impl ValidationResult {
    pub fn criterion(&self, name: &str) -> Option<&CriterionOutcome> {
        self.criteria.iter().find(|c| c.name == name)
    }
}

/// Score a test report against the criteria set.
///
/// Exactly five fixed criteria are evaluated; the approval bar is
/// [`PASS_SCORE_THRESHOLD`].
pub fn validate(
    report: &TestReport,
    criteria: &ValidationCriteria,
    run_duration: Duration,
) -> ValidationResult {
    let success_rate = report.summary.success_rate;
    let error_rate = 1.0 - success_rate;

    let mut outcomes = vec![
        CriterionOutcome {
            name: CRITERION_SUCCESS_RATE.to_string(),
            passed: success_rate >= criteria.min_success_rate,
            observed: success_rate,
            threshold: criteria.min_success_rate,
        },
        CriterionOutcome {
            name: CRITERION_ERROR_RATE.to_string(),
            passed: error_rate <= criteria.max_error_rate,
            observed: error_rate,
            threshold: criteria.max_error_rate,
        },
        CriterionOutcome {
            name: CRITERION_AVG_RESPONSE_TIME.to_string(),
            passed: report.summary.avg_duration_ms <= criteria.max_avg_response_time_ms,
            observed: report.summary.avg_duration_ms,
            threshold: criteria.max_avg_response_time_ms,
        },
        CriterionOutcome {
            name: CRITERION_TEST_DURATION.to_string(),
            passed: run_duration >= criteria.min_test_duration,
            observed: run_duration.as_secs_f64(),
            threshold: criteria.min_test_duration.as_secs_f64(),
        },
    ];

    // Trivially satisfied when no scenarios are required.
    let missing = criteria
        .required_scenarios
        .iter()
        .filter(|s| {
            report
                .scenario_breakdown
                .get(s.tag())
                .map_or(true, |b| b.total == 0)
        })
        .count();
    outcomes.push(CriterionOutcome {
        name: CRITERION_REQUIRED_SCENARIOS.to_string(),
        passed: missing == 0,
        observed: (criteria.required_scenarios.len() - missing) as f64,
        threshold: criteria.required_scenarios.len() as f64,
    });

    let passed_count = outcomes.iter().filter(|c| c.passed).count();
    let score = ((100.0 * passed_count as f64) / outcomes.len() as f64).round() as u8;
    let passed = score >= PASS_SCORE_THRESHOLD;

    let summary = format!(
        "{}/{} criteria passed, score {} — {}",
        passed_count,
        outcomes.len(),
        score,
        if passed { "approved" } else { "rejected" }
    );
    info!("Validation: {}", summary);

    ValidationResult {
        passed,
        score,
        criteria: outcomes,
        summary,
    }
}
