//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (registration.rs):
//!     connection string / EventHubConnection + options
//!     → probe constructors (event_hub.rs, service_bus.rs), fail fast
//!     → HealthCheckRegistration
//!
//! Probe (probe.rs):
//!     ConnectionKey (key.rs)
//!     → ClientRegistry lookup / insert-if-absent (registry.rs)
//!     → entity metadata GET
//!     → HealthCheckResult
//!
//! Service (service.rs) and monitor (monitor.rs):
//!     interval tick → run registrations concurrently (timeouts)
//!     → HealthReport → LatestReport
//! ```
//!
//! # State per key
//! ```text
//! Uninitialized → Initialized   (first probe or eager connection registration)
//! ```
//!
//! # Design Decisions
//! - The client registry is an injected object, not global state
//! - Probe failures are data; only setup errors are returned as `Err`
//! - Deadline policy lives in the service, never inside a probe

pub mod event_hub;
pub mod key;
pub mod monitor;
pub mod probe;
pub mod registration;
pub mod registry;
pub mod service;
pub mod service_bus;
pub mod types;

pub use key::ConnectionKey;
pub use monitor::{HealthMonitor, LatestReport};
pub use probe::{ProbeClients, ResourceHealthCheck};
pub use registration::{HealthCheckRegistration, HealthChecksBuilder, RegistrationOptions};
pub use registry::ClientRegistry;
pub use service::{HealthCheckService, HealthReport, HealthReportEntry};
pub use types::{HealthCheck, HealthCheckContext, HealthCheckResult, HealthStatus, SetupError};
