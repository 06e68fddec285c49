//! Event Hub probe constructors.

use crate::azure::{ConnectionSource, EntityKind, EventHubConnection};
use crate::health::key::{contains_entity_path, ConnectionKey};
use crate::health::probe::{ProbeClients, ResourceHealthCheck};
use crate::health::types::SetupError;

impl ResourceHealthCheck {
    /// Probe an event hub named by the connection string's `EntityPath`.
    pub fn event_hub(connection_string: &str, clients: ProbeClients) -> Result<Self, SetupError> {
        if connection_string.is_empty() {
            return Err(SetupError::MissingArgument("connection_string"));
        }
        if !contains_entity_path(connection_string) {
            return Err(SetupError::InvalidArgument {
                argument: "connection_string",
                reason: "connection string should contain event hub name".to_string(),
            });
        }

        Ok(Self::from_qualified(EntityKind::EventHub, connection_string, clients))
    }

    /// Probe `event_hub_name`; an `EntityPath` already in the connection
    /// string wins.
    pub fn event_hub_with_name(
        connection_string: &str,
        event_hub_name: &str,
        clients: ProbeClients,
    ) -> Result<Self, SetupError> {
        if connection_string.is_empty() {
            return Err(SetupError::MissingArgument("connection_string"));
        }
        if event_hub_name.is_empty() {
            return Err(SetupError::MissingArgument("event_hub_name"));
        }

        let key = ConnectionKey::with_entity_path(connection_string, event_hub_name);
        let source = ConnectionSource::ConnectionString(key.as_str().to_string());
        Ok(Self::from_parts(EntityKind::EventHub, key, source, clients))
    }

    /// Probe through a pre-built connection. The client is created and
    /// registered immediately; a second probe for the same connection
    /// against the same registry is rejected.
    pub fn event_hub_from_connection(
        connection: EventHubConnection,
        clients: ProbeClients,
    ) -> Result<Self, SetupError> {
        if connection.fully_qualified_namespace.is_empty() {
            return Err(SetupError::MissingArgument("fully_qualified_namespace"));
        }
        if connection.event_hub_name.is_empty() {
            return Err(SetupError::MissingArgument("event_hub_name"));
        }

        let key = ConnectionKey::for_connection(&connection);
        let probe = Self::from_parts(
            EntityKind::EventHub,
            key,
            ConnectionSource::Connection(connection),
            clients,
        );
        probe.register_eagerly()?;
        Ok(probe)
    }

    fn from_qualified(kind: EntityKind, connection_string: &str, clients: ProbeClients) -> Self {
        let key = ConnectionKey::from_qualified(connection_string);
        let source = ConnectionSource::ConnectionString(key.as_str().to_string());
        Self::from_parts(kind, key, source, clients)
    }
}
