//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::health::registration::{
    RegistrationOptions, AZURE_EVENT_HUB_NAME, AZURE_QUEUE_NAME, AZURE_SUBSCRIPTION_NAME, AZURE_TOPIC_NAME,
};
use crate::health::HealthStatus;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Monitor loop and HTTP endpoint.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Checks to register, in order.
    pub checks: Vec<CheckConfig>,
}

/// Monitor and HTTP endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for `/health` (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Seconds between check runs.
    pub interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            interval_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Messaging entity a check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    EventHub,
    Queue,
    Topic,
    Subscription,
}

impl CheckKind {
    pub fn default_name(&self) -> &'static str {
        match self {
            CheckKind::EventHub => AZURE_EVENT_HUB_NAME,
            CheckKind::Queue => AZURE_QUEUE_NAME,
            CheckKind::Topic => AZURE_TOPIC_NAME,
            CheckKind::Subscription => AZURE_SUBSCRIPTION_NAME,
        }
    }
}

/// One `[[checks]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    pub kind: CheckKind,

    /// Registration name; defaults per kind.
    #[serde(default)]
    pub name: Option<String>,

    pub connection_string: String,

    /// Event hubs only; may instead be the connection string's EntityPath.
    #[serde(default)]
    pub event_hub_name: Option<String>,

    #[serde(default)]
    pub queue_name: Option<String>,

    /// Topics and subscriptions.
    #[serde(default)]
    pub topic_name: Option<String>,

    #[serde(default)]
    pub subscription_name: Option<String>,

    /// Status reported on failure (default: Unhealthy).
    #[serde(default)]
    pub failure_status: Option<HealthStatus>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Per-check timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CheckConfig {
    /// Name the check registers under.
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.default_name())
    }

    pub fn registration_options(&self) -> RegistrationOptions {
        RegistrationOptions {
            name: self.name.clone(),
            failure_status: self.failure_status,
            tags: self.tags.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.interval_secs, 30);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.checks.is_empty());
    }

    #[test]
    fn test_parse_checks() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            interval_secs = 5

            [[checks]]
            kind = "event_hub"
            connection_string = "Endpoint=sb://x;SharedAccessKey=k"
            event_hub_name = "hub"
            failure_status = "degraded"
            tags = ["ready"]
            timeout_secs = 2

            [[checks]]
            kind = "subscription"
            name = "audit"
            connection_string = "Endpoint=sb://x;SharedAccessKey=k"
            topic_name = "events"
            subscription_name = "audit"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.interval_secs, 5);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.checks.len(), 2);

        let hub = &config.checks[0];
        assert_eq!(hub.kind, CheckKind::EventHub);
        assert_eq!(hub.effective_name(), "azureeventhub");
        let options = hub.registration_options();
        assert_eq!(options.failure_status, Some(HealthStatus::Degraded));
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));

        assert_eq!(config.checks[1].effective_name(), "audit");
    }
}
