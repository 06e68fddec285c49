//! Entity types and error definitions for the messaging transport.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::azure::connection::ConnectionStringError;

/// The kind of messaging entity a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    EventHub,
    Queue,
    Topic,
    Subscription,
}

impl EntityKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::EventHub => "event_hub",
            EntityKind::Queue => "queue",
            EntityKind::Topic => "topic",
            EntityKind::Subscription => "subscription",
        }
    }

    /// REST api-version used when reading the entity description.
    pub fn api_version(&self) -> &'static str {
        match self {
            EntityKind::EventHub => "2014-01",
            EntityKind::Queue | EntityKind::Topic | EntityKind::Subscription => "2021-05",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned across the client boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The connection string could not be understood.
    #[error("invalid connection string: {0}")]
    ConnectionString(#[from] ConnectionStringError),

    /// The request URL could not be built.
    #[error("invalid entity url: {0}")]
    InvalidUrl(String),

    /// Signing the authorization token failed.
    #[error("failed to sign request: {0}")]
    Signing(String),

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered but the entity does not exist.
    #[error("{kind} '{path}' was not found")]
    EntityNotFound { kind: EntityKind, path: String },

    /// The caller cancelled the request before it completed.
    #[error("request was cancelled")]
    Cancelled,
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Metadata returned by a successful entity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityProperties {
    pub kind: EntityKind,
    pub path: String,
    /// Entity status as reported by the service (`Active`, `Disabled`, ...).
    pub status: Option<String>,
    pub updated: Option<String>,
}

impl EntityProperties {
    /// Build properties from an Atom entity description.
    ///
    /// The service answers lookups of a missing entity with an empty feed
    /// rather than 404, so a document without `<entry` is treated as
    /// not found.
    pub fn from_atom(kind: EntityKind, path: &str, body: &str) -> ClientResult<Self> {
        if !body.contains("<entry") {
            return Err(ClientError::EntityNotFound {
                kind,
                path: path.to_string(),
            });
        }

        Ok(Self {
            kind,
            path: path.to_string(),
            status: element_text(body, "Status"),
            updated: element_text(body, "updated"),
        })
    }
}

/// Text content of the first `<name>` (optionally namespaced) element.
///
/// Best-effort scan, not an XML parser: it takes the first match anywhere in
/// the document, ignoring nesting, CDATA and entities. Only used for values
/// that are logged, never for health decisions.
fn element_text(body: &str, name: &str) -> Option<String> {
    let mut rest = body;
    while let Some(open) = rest.find('<') {
        rest = &rest[open + 1..];
        let end = rest.find('>')?;
        let tag = &rest[..end];
        let local = tag.split_whitespace().next().unwrap_or_default();
        let local = local.rsplit(':').next().unwrap_or(local);
        if local == name && !tag.ends_with('/') {
            let content = &rest[end + 1..];
            let close = content.find("</")?;
            return Some(content[..close].trim().to_string());
        }
        rest = &rest[end + 1..];
    }
    None
}
