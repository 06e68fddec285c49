//! Metrics collection and exposition.
//!
//! # Metrics
//! - `messaging_health_check_status` (gauge): 1=healthy, 0.5=degraded, 0=unhealthy
//! - `messaging_health_check_duration_seconds` (histogram): per-check latency
//! - `messaging_health_clients_created_total` (counter): clients built, by entity kind
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::azure::EntityKind;
use crate::health::HealthStatus;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_check_result(check: &str, status: HealthStatus, duration: Duration) {
    metrics::gauge!("messaging_health_check_status", "check" => check.to_string()).set(status.as_gauge());
    metrics::histogram!("messaging_health_check_duration_seconds", "check" => check.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_client_created(kind: EntityKind) {
    metrics::counter!("messaging_health_clients_created_total", "kind" => kind.as_str()).increment(1);
}
