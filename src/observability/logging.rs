//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Configured level applies to this crate only; dependencies stay at `warn`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for `log_level`.
pub fn default_directive(log_level: &str) -> String {
    format!("warn,messaging_health={},probe_cli={}", log_level, log_level)
}

/// Install the global subscriber.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(log_level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
