use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::simulation::ScenarioResult;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Breakdown {
    pub total: u32,
    pub successes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tests: u32,
    pub successful_tests: u32,
    pub failed_tests: u32,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub summary: ReportSummary,
    /// Keyed by scenario tag.
    pub scenario_breakdown: HashMap<String, Breakdown>,
    /// Keyed by user id.
    pub user_breakdown: HashMap<String, Breakdown>,
    pub results: Vec<ScenarioResult>,
}

/// Reduce raw scenario results into a report. Pure and deterministic;
/// recomputing on a grown result list matches a full recompute by
/// construction.
pub fn aggregate(results: &[ScenarioResult]) -> TestReport {
    let total = results.len() as u32;
    let successes = results.iter().filter(|r| r.success).count() as u32;

    let success_rate = if total > 0 {
        f64::from(successes) / f64::from(total)
    } else {
        0.0
    };

    let avg_duration_ms = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.duration_ms).sum::<f64>() / results.len() as f64
    };

    let mut scenario_breakdown: HashMap<String, Breakdown> = HashMap::new();
    let mut user_breakdown: HashMap<String, Breakdown> = HashMap::new();
    for result in results {
        let s = scenario_breakdown
            .entry(result.scenario.tag().to_string())
            .or_default();
        s.total += 1;
        let u = user_breakdown.entry(result.user_id.clone()).or_default();
        u.total += 1;
        if result.success {
            s.successes += 1;
            u.successes += 1;
        }
    }

    TestReport {
        summary: ReportSummary {
            total_tests: total,
            successful_tests: successes,
            failed_tests: total - successes,
            success_rate,
            avg_duration_ms,
            generated_at: Utc::now(),
        },
        scenario_breakdown,
        user_breakdown,
        results: results.to_vec(),
    }
}
