//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, service, monitor produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (check status gauges, durations, client counts)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
