//! Resource health probe.
//!
//! # Check Flow
//! ```text
//! check_health(context)
//!     → registry lookup by ConnectionKey
//!     → miss: factory.create + try_insert (lost race = unhealthy)
//!     → client.get_properties(context.cancellation)
//!     → Healthy | Unhealthy(failure_status, error)
//! ```
//!
//! # Design Decisions
//! - Arguments are validated when the probe is built, not when it runs
//! - Every failure at run time becomes a result, nothing is raised
//! - A lost insert race fails the current invocation; the next one finds
//!   the winning client

use std::sync::Arc;

use async_trait::async_trait;

use crate::azure::{ClientFactory, ConnectionSource, EntityClient, EntityKind, RestClientFactory};
use crate::health::key::ConnectionKey;
use crate::health::registry::ClientRegistry;
use crate::health::types::{HealthCheck, HealthCheckContext, HealthCheckResult, SetupError};
use crate::observability::metrics;

/// Registry and factory shared by the probes of one composition root.
#[derive(Clone)]
pub struct ProbeClients {
    pub registry: ClientRegistry,
    pub factory: Arc<dyn ClientFactory>,
}

impl ProbeClients {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            registry: ClientRegistry::new(),
            factory,
        }
    }

    /// REST clients over a shared HTTP client.
    pub fn rest(http: reqwest::Client) -> Self {
        Self::new(Arc::new(RestClientFactory::new(http)))
    }

    pub fn with_registry(mut self, registry: ClientRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl std::fmt::Debug for ProbeClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeClients").field("registry", &self.registry).finish()
    }
}

/// Health probe bound to one messaging entity.
pub struct ResourceHealthCheck {
    kind: EntityKind,
    key: ConnectionKey,
    source: ConnectionSource,
    clients: ProbeClients,
}

impl ResourceHealthCheck {
    pub(crate) fn from_parts(
        kind: EntityKind,
        key: ConnectionKey,
        source: ConnectionSource,
        clients: ProbeClients,
    ) -> Self {
        Self {
            kind,
            key,
            source,
            clients,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// Create the client now and register it; fails if one is already
    /// registered under this probe's key.
    pub(crate) fn register_eagerly(&self) -> Result<(), SetupError> {
        let client = self.clients.factory.create(self.kind, &self.source)?;
        metrics::record_client_created(self.kind);
        self.clients
            .registry
            .try_insert(self.key.clone(), client)
            .map(|_| ())
            .map_err(|_| SetupError::DuplicateClient {
                kind: self.kind,
                entity: self.key.redacted(),
            })
    }

    fn resolve_client(&self, context: &HealthCheckContext) -> Result<Arc<dyn EntityClient>, HealthCheckResult> {
        if let Some(client) = self.clients.registry.get(&self.key) {
            return Ok(client);
        }

        let created = self
            .clients
            .factory
            .create(self.kind, &self.source)
            .map_err(|e| HealthCheckResult::from_error(context.failure_status, e))?;
        metrics::record_client_created(self.kind);

        self.clients
            .registry
            .try_insert(self.key.clone(), created)
            .map_err(|_| {
                tracing::warn!(
                    check = %context.name,
                    key = %self.key,
                    "Lost client registration race"
                );
                HealthCheckResult::unhealthy(
                    context.failure_status,
                    format!("{} client can't be added into the registry", self.kind),
                )
            })
    }
}

#[async_trait]
impl HealthCheck for ResourceHealthCheck {
    async fn check_health(&self, context: &HealthCheckContext) -> HealthCheckResult {
        let client = match self.resolve_client(context) {
            Ok(client) => client,
            Err(result) => return result,
        };

        match client.get_properties(&context.cancellation).await {
            Ok(properties) => {
                tracing::debug!(
                    check = %context.name,
                    kind = %self.kind,
                    entity = %properties.path,
                    status = ?properties.status,
                    "Entity reachable"
                );
                HealthCheckResult::healthy()
            }
            Err(e) => {
                tracing::warn!(
                    check = %context.name,
                    kind = %self.kind,
                    key = %self.key,
                    error = %e,
                    "Entity health check failed"
                );
                HealthCheckResult::from_error(context.failure_status, e)
            }
        }
    }
}

impl std::fmt::Debug for ResourceHealthCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHealthCheck")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish()
    }
}
