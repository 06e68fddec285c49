//! Health probes for Azure messaging resources.
//!
//! Event Hub, Service Bus queue, topic and subscription probes share one
//! shape: build a connection key, reuse or create a client from an injected
//! registry, read the entity's metadata, report the outcome.

pub mod azure;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use health::{
    HealthCheck, HealthCheckContext, HealthCheckResult, HealthCheckService, HealthChecksBuilder, HealthStatus,
    ProbeClients, ResourceHealthCheck,
};
pub use lifecycle::Shutdown;
