//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every check entry names the fields its kind needs
//! - Validate value ranges (interval > 0, timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, CheckConfig, CheckKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("checks[{index}]: `{field}` is required for {kind:?}")]
    MissingField {
        index: usize,
        kind: CheckKind,
        field: &'static str,
    },

    #[error("checks[{index}]: timeout_secs must be greater than zero")]
    ZeroTimeout { index: usize },

    #[error("checks[{index}]: name '{name}' is already used")]
    DuplicateName { index: usize, name: String },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }
    if config.server.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut names = HashSet::new();
    for (index, check) in config.checks.iter().enumerate() {
        validate_check(index, check, &mut errors);
        let name = check.effective_name();
        if !names.insert(name) {
            errors.push(ValidationError::DuplicateName {
                index,
                name: name.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_check(index: usize, check: &CheckConfig, errors: &mut Vec<ValidationError>) {
    let mut require = |field: &'static str, value: Option<&str>| {
        if value.map_or(true, str::is_empty) {
            errors.push(ValidationError::MissingField {
                index,
                kind: check.kind,
                field,
            });
        }
    };

    require("connection_string", Some(check.connection_string.as_str()));
    match check.kind {
        // The event hub name may come from the connection string instead.
        CheckKind::EventHub => {}
        CheckKind::Queue => require("queue_name", check.queue_name.as_deref()),
        CheckKind::Topic => require("topic_name", check.topic_name.as_deref()),
        CheckKind::Subscription => {
            require("topic_name", check.topic_name.as_deref());
            require("subscription_name", check.subscription_name.as_deref());
        }
    }

    if check.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout { index });
    }
}
