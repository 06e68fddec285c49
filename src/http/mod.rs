//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! GET /health       → LatestReport (published by the monitor)
//! GET /health/{tag} → HealthCheckService, tag-filtered, on demand
//! ```

pub mod server;

pub use server::HealthServer;
