//! Health check execution and reporting.
//!
//! # Responsibilities
//! - Run selected registrations concurrently
//! - Enforce per-registration timeouts by cancelling the check's token
//! - Aggregate entries into a [`HealthReport`]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::health::registration::HealthCheckRegistration;
use crate::health::types::{HealthCheckContext, HealthCheckResult, HealthStatus};
use crate::observability::metrics;

/// One check's outcome inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReportEntry {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Aggregated outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_duration_ms: u64,
    pub entries: BTreeMap<String, HealthReportEntry>,
}

impl HealthReport {
    pub fn new(entries: BTreeMap<String, HealthReportEntry>, total_duration: Duration) -> Self {
        Self {
            status: HealthStatus::worst(entries.values().map(|e| e.status)),
            total_duration_ms: millis(total_duration),
            entries,
        }
    }
}

/// Runs registered checks on demand.
#[derive(Debug, Clone)]
pub struct HealthCheckService {
    registrations: Arc<[HealthCheckRegistration]>,
}

impl HealthCheckService {
    pub fn new(registrations: Vec<HealthCheckRegistration>) -> Self {
        Self {
            registrations: registrations.into(),
        }
    }

    pub fn registrations(&self) -> &[HealthCheckRegistration] {
        &self.registrations
    }

    /// Run every registration.
    pub async fn check_health(&self) -> HealthReport {
        self.check_health_filtered(|_| true, &CancellationToken::new()).await
    }

    /// Run the registrations carrying `tag`.
    pub async fn check_health_tagged(&self, tag: &str) -> HealthReport {
        self.check_health_filtered(|r| r.has_tag(tag), &CancellationToken::new())
            .await
    }

    /// Run the registrations matching `predicate`. Cancelling `cancellation`
    /// cancels every check still running.
    pub async fn check_health_filtered<F>(&self, predicate: F, cancellation: &CancellationToken) -> HealthReport
    where
        F: Fn(&HealthCheckRegistration) -> bool,
    {
        let started = Instant::now();
        let runs = self
            .registrations
            .iter()
            .filter(|r| predicate(r))
            .map(|r| run_registration(r, cancellation.child_token()));

        let entries: BTreeMap<_, _> = join_all(runs).await.into_iter().collect();
        let report = HealthReport::new(entries, started.elapsed());

        tracing::debug!(
            status = %report.status,
            checks = report.entries.len(),
            duration_ms = report.total_duration_ms,
            "Health report complete"
        );
        report
    }
}

async fn run_registration(
    registration: &HealthCheckRegistration,
    cancellation: CancellationToken,
) -> (String, HealthReportEntry) {
    let context = HealthCheckContext::new(registration.name.clone(), registration.failure_status)
        .with_cancellation(cancellation.clone());
    let started = Instant::now();

    let result = match registration.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, registration.check.check_health(&context)).await {
            Ok(result) => result,
            Err(_) => {
                cancellation.cancel();
                tracing::warn!(
                    check = %registration.name,
                    timeout_ms = millis(timeout),
                    "Health check timed out"
                );
                HealthCheckResult::unhealthy(
                    registration.failure_status,
                    format!("timed out after {}ms", millis(timeout)),
                )
            }
        },
        None => registration.check.check_health(&context).await,
    };

    let elapsed = started.elapsed();
    metrics::record_check_result(&registration.name, result.status, elapsed);

    let entry = HealthReportEntry {
        status: result.status,
        description: result.description,
        error: result.error.map(|e| e.to_string()),
        duration_ms: millis(elapsed),
        tags: registration.tags.clone(),
    };
    (registration.name.clone(), entry)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
