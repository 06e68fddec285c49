//! Health check results, context and setup errors.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::azure::{ClientError, EntityKind};

/// Reported health of a check or a whole report.
///
/// Variants are ordered from worst to best so the aggregate of a report
/// is the minimum of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(alias = "unhealthy")]
    Unhealthy,
    #[serde(alias = "degraded")]
    Degraded,
    #[serde(alias = "healthy")]
    Healthy,
}

impl HealthStatus {
    /// Worst status in `statuses`, `Healthy` when empty.
    pub fn worst<I: IntoIterator<Item = HealthStatus>>(statuses: I) -> HealthStatus {
        statuses.into_iter().min().unwrap_or(HealthStatus::Healthy)
    }

    /// Numeric form used for gauges.
    pub fn as_gauge(&self) -> f64 {
        match self {
            HealthStatus::Healthy => 1.0,
            HealthStatus::Degraded => 0.5,
            HealthStatus::Unhealthy => 0.0,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Unhealthy => "Unhealthy",
        };
        f.write_str(s)
    }
}

/// Error attached to a failed result.
pub type CheckError = Arc<dyn StdError + Send + Sync + 'static>;

/// Outcome of a single check invocation.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub description: Option<String>,
    pub error: Option<CheckError>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            description: None,
            error: None,
        }
    }

    /// Failure explained by a reason only.
    pub fn unhealthy(status: HealthStatus, description: impl Into<String>) -> Self {
        Self {
            status,
            description: Some(description.into()),
            error: None,
        }
    }

    /// Failure carrying the error that caused it.
    pub fn from_error<E>(status: HealthStatus, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            status,
            description: Some(error.to_string()),
            error: Some(Arc::new(error)),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    /// The attached error as a [`ClientError`], if it is one.
    pub fn client_error(&self) -> Option<&ClientError> {
        self.error.as_deref().and_then(|e| e.downcast_ref::<ClientError>())
    }
}

/// Per-invocation input handed to a check by the scheduler.
#[derive(Debug, Clone)]
pub struct HealthCheckContext {
    /// Registration name, used for log correlation.
    pub name: String,
    /// Status to report when the check fails.
    pub failure_status: HealthStatus,
    pub cancellation: CancellationToken,
}

impl HealthCheckContext {
    pub fn new(name: impl Into<String>, failure_status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            failure_status,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// A check the health service can run.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Run the check. Failures are reported in the result, never raised.
    async fn check_health(&self, context: &HealthCheckContext) -> HealthCheckResult;
}

/// Configuration errors raised while building checks.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("argument `{0}` must not be empty")]
    MissingArgument(&'static str),

    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument { argument: &'static str, reason: String },

    #[error("a {kind} client is already registered for {entity}")]
    DuplicateClient { kind: EntityKind, entity: String },

    #[error("a health check named '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("failed to create client: {0}")]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_status() {
        assert_eq!(HealthStatus::worst([]), HealthStatus::Healthy);
        assert_eq!(
            HealthStatus::worst([HealthStatus::Healthy, HealthStatus::Degraded]),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::worst([HealthStatus::Degraded, HealthStatus::Unhealthy, HealthStatus::Healthy]),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_from_error_keeps_status_and_error() {
        let result = HealthCheckResult::from_error(HealthStatus::Degraded, ClientError::Cancelled);
        assert_eq!(result.status, HealthStatus::Degraded);
        assert_eq!(result.description.as_deref(), Some("request was cancelled"));
        assert!(matches!(result.client_error(), Some(ClientError::Cancelled)));
    }

    #[test]
    fn test_status_deserializes_either_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            status: HealthStatus,
        }
        let w: Wrapper = toml::from_str("status = \"degraded\"").unwrap();
        assert_eq!(w.status, HealthStatus::Degraded);
        let w: Wrapper = toml::from_str("status = \"Unhealthy\"").unwrap();
        assert_eq!(w.status, HealthStatus::Unhealthy);
    }
}
