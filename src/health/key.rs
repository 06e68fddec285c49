//! Connection keys identifying one resource + transport pair.

use std::fmt;

use crate::azure::connection::{EventHubConnection, ENTITY_PATH_SEGMENT};

/// Normalized key used for client lookup.
///
/// The key embeds the connection string, so `Display` and `Debug` only show
/// the endpoint and entity path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey(String);

impl ConnectionKey {
    /// Key for `connection_string` addressing `entity_path`.
    ///
    /// A string that already carries an `EntityPath=` segment keeps it;
    /// otherwise `;EntityPath=<entity_path>` is appended. Trailing
    /// separators are trimmed either way.
    pub fn with_entity_path(connection_string: &str, entity_path: &str) -> Self {
        if contains_entity_path(connection_string) {
            return Self::from_qualified(connection_string);
        }
        Self::appending(connection_string, entity_path)
    }

    /// Key for `connection_string` addressing `entity_path`, replacing any
    /// `EntityPath=` segment the string already carries.
    pub fn replacing_entity_path(connection_string: &str, entity_path: &str) -> Self {
        if !contains_entity_path(connection_string) {
            return Self::appending(connection_string, entity_path);
        }
        let base = connection_string
            .split(';')
            .filter(|segment| !segment.trim_start().starts_with(ENTITY_PATH_SEGMENT))
            .collect::<Vec<_>>()
            .join(";");
        Self::appending(&base, entity_path)
    }

    /// Key of a pre-built Event Hub connection.
    pub fn for_connection(connection: &EventHubConnection) -> Self {
        Self(format!(
            "{};{}{}",
            connection.fully_qualified_namespace, ENTITY_PATH_SEGMENT, connection.event_hub_name
        ))
    }

    /// Key for a connection string that must already name its entity.
    pub fn from_qualified(connection_string: &str) -> Self {
        Self(trim_separators(connection_string).to_string())
    }

    fn appending(connection_string: &str, entity_path: &str) -> Self {
        Self(format!(
            "{};{}{}",
            trim_separators(connection_string),
            ENTITY_PATH_SEGMENT,
            entity_path
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Endpoint and entity path only, safe to log.
    pub fn redacted(&self) -> String {
        let mut endpoint = None;
        let mut entity = None;
        let mut first = None;
        for segment in self.0.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if first.is_none() {
                first = Some(segment);
            }
            match segment.split_once('=') {
                Some((k, v)) if k.trim().eq_ignore_ascii_case("endpoint") => endpoint = Some(v),
                Some((k, v)) if k.trim().eq_ignore_ascii_case("entitypath") => entity = Some(v),
                _ => {}
            }
        }
        // Connection-based keys start with the bare namespace.
        let endpoint = endpoint.or(first.filter(|s| !s.contains('='))).unwrap_or("?");
        format!("{}/{}", endpoint.trim_end_matches('/'), entity.unwrap_or("?"))
    }
}

fn trim_separators(connection_string: &str) -> &str {
    connection_string.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Whether `connection_string` names its entity.
pub fn contains_entity_path(connection_string: &str) -> bool {
    connection_string.contains(ENTITY_PATH_SEGMENT)
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionKey").field(&self.redacted()).finish()
    }
}
