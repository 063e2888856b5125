use canary_supervisor::recommend::{recommend, DeploymentContext, Priority, RecommendationKind};
use canary_supervisor::validator::{
    CriterionOutcome, ValidationResult, CRITERION_AVG_RESPONSE_TIME, CRITERION_ERROR_RATE,
};

fn validation(score: u8, passed: bool, failed_criteria: &[&str]) -> ValidationResult {
    let criteria = [CRITERION_ERROR_RATE, CRITERION_AVG_RESPONSE_TIME]
        .iter()
        .map(|name| CriterionOutcome {
            name: name.to_string(),
            passed: !failed_criteria.contains(name),
            observed: 0.0,
            threshold: 0.0,
        })
        .collect();
    ValidationResult {
        passed,
        score,
        criteria,
        summary: String::new(),
    }
}

fn context() -> DeploymentContext {
    DeploymentContext {
        deployment_url: "https://canary.example.com".to_string(),
        branch: "feature-x".to_string(),
    }
}

#[test]
fn high_score_recommends_aggressive_rollout() {
    let recs = recommend(
        &validation(100, true, &[]),
        &["flag-a".to_string()],
        &context(),
    );

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].kind, RecommendationKind::Rollout);
    assert_eq!(recs[0].priority, Priority::High);
    assert_eq!(recs[0].flag_key.as_deref(), Some("flag-a"));
}

#[test]
fn passing_band_recommends_cautious_rollout() {
    let recs = recommend(&validation(80, true, &[]), &[], &context());

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].kind, RecommendationKind::Rollout);
    assert_eq!(recs[0].priority, Priority::Medium);
}

#[test]
fn low_score_recommends_rollback() {
    let recs = recommend(&validation(40, false, &[]), &[], &context());

    assert_eq!(recs[0].kind, RecommendationKind::Rollback);
    assert_eq!(recs[0].priority, Priority::High);
}

#[test]
fn middle_band_recommends_investigation() {
    let recs = recommend(&validation(60, false, &[]), &[], &context());

    assert_eq!(recs[0].kind, RecommendationKind::Investigate);
    assert_eq!(recs[0].priority, Priority::Medium);
}

#[test]
fn criterion_rules_are_additive() {
    // A badly failing canary with slow responses and a high error rate
    // triggers rollback plus both additive rules.
    let recs = recommend(
        &validation(40, false, &[CRITERION_ERROR_RATE, CRITERION_AVG_RESPONSE_TIME]),
        &[],
        &context(),
    );

    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].kind, RecommendationKind::Rollback);
    assert!(recs
        .iter()
        .any(|r| r.kind == RecommendationKind::Optimize && r.priority == Priority::High));
    assert!(recs
        .iter()
        .any(|r| r.kind == RecommendationKind::Investigate && r.priority == Priority::High));
}

#[test]
fn only_first_score_band_fires() {
    let recs = recommend(&validation(95, true, &[]), &[], &context());
    let rollout_count = recs
        .iter()
        .filter(|r| r.kind == RecommendationKind::Rollout)
        .count();
    assert_eq!(rollout_count, 1);
}
