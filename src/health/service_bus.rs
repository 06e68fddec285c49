//! Service Bus probe constructors (queue, topic, subscription).

use crate::azure::{ConnectionSource, EntityKind};
use crate::health::key::ConnectionKey;
use crate::health::probe::{ProbeClients, ResourceHealthCheck};
use crate::health::types::SetupError;

impl ResourceHealthCheck {
    pub fn queue(connection_string: &str, queue_name: &str, clients: ProbeClients) -> Result<Self, SetupError> {
        require("connection_string", connection_string)?;
        require("queue_name", queue_name)?;
        Ok(Self::service_bus(EntityKind::Queue, connection_string, queue_name.to_string(), clients))
    }

    pub fn topic(connection_string: &str, topic_name: &str, clients: ProbeClients) -> Result<Self, SetupError> {
        require("connection_string", connection_string)?;
        require("topic_name", topic_name)?;
        Ok(Self::service_bus(EntityKind::Topic, connection_string, topic_name.to_string(), clients))
    }

    pub fn subscription(
        connection_string: &str,
        topic_name: &str,
        subscription_name: &str,
        clients: ProbeClients,
    ) -> Result<Self, SetupError> {
        require("connection_string", connection_string)?;
        require("topic_name", topic_name)?;
        require("subscription_name", subscription_name)?;
        let path = format!("{}/Subscriptions/{}", topic_name, subscription_name);
        Ok(Self::service_bus(EntityKind::Subscription, connection_string, path, clients))
    }

    fn service_bus(kind: EntityKind, connection_string: &str, entity_path: String, clients: ProbeClients) -> Self {
        let key = ConnectionKey::replacing_entity_path(connection_string, &entity_path);
        let source = ConnectionSource::ConnectionString(key.as_str().to_string());
        Self::from_parts(kind, key, source, clients)
    }
}

fn require(argument: &'static str, value: &str) -> Result<(), SetupError> {
    if value.is_empty() {
        return Err(SetupError::MissingArgument(argument));
    }
    Ok(())
}
