use serde::{Deserialize, Serialize};

use crate::validator::{ValidationResult, CRITERION_AVG_RESPONSE_TIME, CRITERION_ERROR_RATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Rollout,
    Rollback,
    Investigate,
    Optimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub action: String,
    pub flag_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeploymentContext {
    pub deployment_url: String,
    pub branch: String,
}

/// Map a validation outcome to recommended operator actions.
///
/// Only the first matching score band fires; the response-time and
/// error-rate rules are additive regardless of band.
pub fn recommend(
    validation: &ValidationResult,
    flags: &[String],
    context: &DeploymentContext,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let flag_key = flags.first().cloned();
    let score = validation.score;

    if validation.passed && score >= 90 {
        recs.push(Recommendation {
            kind: RecommendationKind::Rollout,
            priority: Priority::High,
            message: format!(
                "Canary for {} on {} is healthy (score {})",
                context.branch, context.deployment_url, score
            ),
            action: "Increase rollout to 50-100% of users".to_string(),
            flag_key: flag_key.clone(),
        });
    } else if validation.passed {
        recs.push(Recommendation {
            kind: RecommendationKind::Rollout,
            priority: Priority::Medium,
            message: format!("Canary passed with reservations (score {})", score),
            action: "Increase rollout to 25-50% of users".to_string(),
            flag_key: flag_key.clone(),
        });
    } else if score < 60 {
        recs.push(Recommendation {
            kind: RecommendationKind::Rollback,
            priority: Priority::High,
            message: format!("Canary failing badly (score {})", score),
            action: "Disable feature flags and investigate failures".to_string(),
            flag_key: flag_key.clone(),
        });
    } else {
        recs.push(Recommendation {
            kind: RecommendationKind::Investigate,
            priority: Priority::Medium,
            message: format!("Canary below the approval bar (score {})", score),
            action: "Review failed criteria and test results".to_string(),
            flag_key: flag_key.clone(),
        });
    }

    if let Some(c) = validation.criterion(CRITERION_AVG_RESPONSE_TIME) {
        if !c.passed {
            recs.push(Recommendation {
                kind: RecommendationKind::Optimize,
                priority: Priority::High,
                message: format!(
                    "Average response time {:.0}ms exceeds the {:.0}ms budget",
                    c.observed, c.threshold
                ),
                action: "Profile slow endpoints before widening exposure".to_string(),
                flag_key: flag_key.clone(),
            });
        }
    }

    if let Some(c) = validation.criterion(CRITERION_ERROR_RATE) {
        if !c.passed {
            recs.push(Recommendation {
                kind: RecommendationKind::Investigate,
                priority: Priority::High,
                message: format!(
                    "Error rate {:.1}% exceeds the {:.1}% ceiling",
                    c.observed * 100.0,
                    c.threshold * 100.0
                ),
                action: "Triage recorded test errors by kind".to_string(),
                flag_key,
            });
        }
    }

    recs
}
