//! Health check registration.
//!
//! # Responsibilities
//! - Build probes from human-supplied parameters, failing fast
//! - Attach name, failure status, tags and timeout to each check
//! - Hand the finished set to [`HealthCheckService`]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::azure::EventHubConnection;
use crate::health::probe::{ProbeClients, ResourceHealthCheck};
use crate::health::service::HealthCheckService;
use crate::health::types::{HealthCheck, HealthStatus, SetupError};

pub const AZURE_EVENT_HUB_NAME: &str = "azureeventhub";
pub const AZURE_QUEUE_NAME: &str = "azurequeue";
pub const AZURE_TOPIC_NAME: &str = "azuretopic";
pub const AZURE_SUBSCRIPTION_NAME: &str = "azuresubscription";

/// Optional settings shared by every `add_*` helper.
#[derive(Debug, Clone, Default)]
pub struct RegistrationOptions {
    /// Registration name; the helper's default name when `None`.
    pub name: Option<String>,
    /// Status reported on failure; `Unhealthy` when `None`.
    pub failure_status: Option<HealthStatus>,
    pub tags: Vec<String>,
    pub timeout: Option<Duration>,
}

impl RegistrationOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A named check plus the policy the service applies around it.
#[derive(Clone)]
pub struct HealthCheckRegistration {
    pub name: String,
    pub check: Arc<dyn HealthCheck>,
    pub failure_status: HealthStatus,
    pub tags: Vec<String>,
    pub timeout: Option<Duration>,
}

impl HealthCheckRegistration {
    pub fn new(default_name: &str, check: Arc<dyn HealthCheck>, options: RegistrationOptions) -> Self {
        Self {
            name: options.name.unwrap_or_else(|| default_name.to_string()),
            check,
            failure_status: options.failure_status.unwrap_or(HealthStatus::Unhealthy),
            tags: options.tags,
            timeout: options.timeout,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl std::fmt::Debug for HealthCheckRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRegistration")
            .field("name", &self.name)
            .field("failure_status", &self.failure_status)
            .field("tags", &self.tags)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Collects registrations; all probes share one [`ProbeClients`].
#[derive(Debug)]
pub struct HealthChecksBuilder {
    clients: ProbeClients,
    registrations: Vec<HealthCheckRegistration>,
    names: HashSet<String>,
}

impl HealthChecksBuilder {
    pub fn new(clients: ProbeClients) -> Self {
        Self {
            clients,
            registrations: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn clients(&self) -> &ProbeClients {
        &self.clients
    }

    /// Add a prepared registration. Names must be unique.
    pub fn add(&mut self, registration: HealthCheckRegistration) -> Result<&mut Self, SetupError> {
        if !self.names.insert(registration.name.clone()) {
            return Err(SetupError::DuplicateRegistration(registration.name));
        }
        tracing::debug!(
            name = %registration.name,
            failure_status = %registration.failure_status,
            tags = ?registration.tags,
            "Registered health check"
        );
        self.registrations.push(registration);
        Ok(self)
    }

    /// Add an Event Hub check. Without `event_hub_name` the connection
    /// string must carry an `EntityPath`.
    pub fn add_azure_event_hub(
        &mut self,
        connection_string: &str,
        event_hub_name: Option<&str>,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        let clients = self.clients.clone();
        let probe = match event_hub_name {
            None => ResourceHealthCheck::event_hub(connection_string, clients)?,
            Some(name) => ResourceHealthCheck::event_hub_with_name(connection_string, name, clients)?,
        };
        self.add_probe(AZURE_EVENT_HUB_NAME, probe, options)
    }

    /// Add an Event Hub check over a pre-built connection.
    pub fn add_azure_event_hub_connection(
        &mut self,
        connection: EventHubConnection,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        let probe = ResourceHealthCheck::event_hub_from_connection(connection, self.clients.clone())?;
        self.add_probe(AZURE_EVENT_HUB_NAME, probe, options)
    }

    pub fn add_azure_service_bus_queue(
        &mut self,
        connection_string: &str,
        queue_name: &str,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        let probe = ResourceHealthCheck::queue(connection_string, queue_name, self.clients.clone())?;
        self.add_probe(AZURE_QUEUE_NAME, probe, options)
    }

    pub fn add_azure_service_bus_topic(
        &mut self,
        connection_string: &str,
        topic_name: &str,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        let probe = ResourceHealthCheck::topic(connection_string, topic_name, self.clients.clone())?;
        self.add_probe(AZURE_TOPIC_NAME, probe, options)
    }

    pub fn add_azure_service_bus_subscription(
        &mut self,
        connection_string: &str,
        topic_name: &str,
        subscription_name: &str,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        let probe = ResourceHealthCheck::subscription(
            connection_string,
            topic_name,
            subscription_name,
            self.clients.clone(),
        )?;
        self.add_probe(AZURE_SUBSCRIPTION_NAME, probe, options)
    }

    fn add_probe(
        &mut self,
        default_name: &str,
        probe: ResourceHealthCheck,
        options: RegistrationOptions,
    ) -> Result<&mut Self, SetupError> {
        self.add(HealthCheckRegistration::new(default_name, Arc::new(probe), options))
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn build(self) -> HealthCheckService {
        HealthCheckService::new(self.registrations)
    }
}
