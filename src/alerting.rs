use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

use crate::config::{
    ALERT_CRITICAL_AVG_DURATION_MS, ALERT_CRITICAL_ERROR_RATE, ALERT_CRITICAL_SUCCESS_RATE,
    ALERT_DEDUP_WINDOW_SECS, ALERT_MAX_AVG_DURATION_MS, ALERT_MAX_ERROR_RATE,
    ALERT_MIN_SUCCESS_RATE, ALERT_RETENTION,
};
use crate::report::TestReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Failure,
    Performance,
    Error,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
}

// ============================================================================
// Report bus
// ============================================================================

type ReportCallback = Box<dyn Fn(&TestReport) + Send + Sync>;

/// Explicit publish/subscribe fan-out for test reports, owned by the
/// composition root. No ambient global.
pub struct ReportBus {
    inner: Mutex<BusInner>,
}

struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, ReportCallback)>,
}

/// Handle returned by [`ReportBus::subscribe`]; pass back to `unsubscribe`
/// to stop delivery.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
}

impl Default for ReportBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBus {
    pub fn new() -> Self {
        ReportBus {
            inner: Mutex::new(BusInner {
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn subscribe(&self, callback: ReportCallback) -> Subscription {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, callback));
        Subscription { id }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.retain(|(id, _)| *id != subscription.id);
    }

    pub fn publish(&self, report: &TestReport) {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        for (_, callback) in &inner.subscribers {
            callback(report);
        }
    }
}

// ============================================================================
// Alert center
// ============================================================================

/// Evaluates report health thresholds into deduplicated, severity-ranked
/// alerts with a bounded retention window.
pub struct AlertCenter {
    alerts: Mutex<VecDeque<Alert>>,
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertCenter {
    pub fn new() -> Self {
        AlertCenter {
            alerts: Mutex::new(VecDeque::new()),
        }
    }

    /// Evaluate one report now. Returns the alerts actually created.
    pub fn ingest(&self, report: &TestReport) -> Vec<Alert> {
        self.ingest_at(report, Utc::now())
    }

    /// Evaluate one report at an explicit time (tests script the clock).
    pub fn ingest_at(&self, report: &TestReport, now: DateTime<Utc>) -> Vec<Alert> {
        let mut created = Vec::new();
        for (kind, severity, message) in evaluate_thresholds(report) {
            if let Some(alert) = self.raise(kind, severity, message, now) {
                created.push(alert);
            }
        }
        created
    }

    /// Create an alert unless an unresolved duplicate exists inside the
    /// dedup window. At most the newest [`ALERT_RETENTION`] alerts are kept.
    fn raise(
        &self,
        kind: AlertKind,
        severity: AlertSeverity,
        message: String,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let mut alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());

        let cutoff = now - chrono::Duration::seconds(ALERT_DEDUP_WINDOW_SECS);
        let duplicate = alerts
            .iter()
            .any(|a| !a.resolved && a.kind == kind && a.severity == severity && a.timestamp > cutoff);
        if duplicate {
            return None;
        }

        let alert = Alert {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            kind,
            message,
            timestamp: now,
            resolved: false,
        };
        warn!("Alert [{:?}/{:?}]: {}", severity, kind, alert.message);

        alerts.push_back(alert.clone());
        while alerts.len() > ALERT_RETENTION {
            alerts.pop_front();
        }
        Some(alert)
    }

    pub fn resolve(&self, id: &str) -> bool {
        let mut alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        match alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.resolved = true;
                true
            }
            None => false,
        }
    }

    pub fn unresolved(&self) -> Vec<Alert> {
        let alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        alerts.iter().filter(|a| !a.resolved).cloned().collect()
    }

    pub fn all(&self) -> Vec<Alert> {
        let alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        alerts.iter().cloned().collect()
    }
}

/// The three independent report thresholds.
fn evaluate_thresholds(report: &TestReport) -> Vec<(AlertKind, AlertSeverity, String)> {
    let mut found = Vec::new();
    let summary = &report.summary;

    if summary.success_rate < ALERT_MIN_SUCCESS_RATE {
        let severity = if summary.success_rate < ALERT_CRITICAL_SUCCESS_RATE {
            AlertSeverity::Critical
        } else {
            AlertSeverity::High
        };
        found.push((
            AlertKind::Failure,
            severity,
            format!(
                "Success rate {:.1}% below {:.1}%",
                summary.success_rate * 100.0,
                ALERT_MIN_SUCCESS_RATE * 100.0
            ),
        ));
    }

    if summary.avg_duration_ms > ALERT_MAX_AVG_DURATION_MS {
        let severity = if summary.avg_duration_ms > ALERT_CRITICAL_AVG_DURATION_MS {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Medium
        };
        found.push((
            AlertKind::Performance,
            severity,
            format!(
                "Average duration {:.0}ms above {:.0}ms",
                summary.avg_duration_ms, ALERT_MAX_AVG_DURATION_MS
            ),
        ));
    }

    let error_rate = 1.0 - summary.success_rate;
    if error_rate > ALERT_MAX_ERROR_RATE {
        let severity = if error_rate > ALERT_CRITICAL_ERROR_RATE {
            AlertSeverity::Critical
        } else {
            AlertSeverity::High
        };
        found.push((
            AlertKind::Error,
            severity,
            format!(
                "Error rate {:.1}% above {:.1}%",
                error_rate * 100.0,
                ALERT_MAX_ERROR_RATE * 100.0
            ),
        ));
    }

    found
}
