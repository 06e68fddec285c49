//! Connection strings and pre-built connections.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Segment marking the entity path inside a connection string.
pub const ENTITY_PATH_SEGMENT: &str = "EntityPath=";

/// Errors produced while parsing a connection string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    #[error("connection string is empty")]
    Empty,

    #[error("malformed segment '{0}', expected key=value")]
    MalformedSegment(String),

    #[error("missing Endpoint")]
    MissingEndpoint,

    #[error("invalid Endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("missing SharedAccessKeyName/SharedAccessKey or SharedAccessSignature")]
    MissingCredential,

    #[error("missing EntityPath")]
    MissingEntityPath,
}

/// Credential used to authorize requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Named policy and key; signatures are generated per request.
    SharedAccessKey { name: String, key: String },
    /// Pre-computed `SharedAccessSignature sr=...` token.
    SharedAccessSignature(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::SharedAccessKey { name, .. } => f
                .debug_struct("SharedAccessKey")
                .field("name", name)
                .field("key", &"<redacted>")
                .finish(),
            Credential::SharedAccessSignature(_) => f.write_str("SharedAccessSignature(<redacted>)"),
        }
    }
}

/// A parsed Service Bus / Event Hubs connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: Url,
    pub credential: Credential,
    pub entity_path: Option<String>,
    /// Local emulator: talk plain HTTP instead of HTTPS.
    pub use_development_emulator: bool,
}

impl ConnectionString {
    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// Keys are matched case-insensitively; empty segments are ignored.
    pub fn parse(input: &str) -> Result<Self, ConnectionStringError> {
        if input.trim().is_empty() {
            return Err(ConnectionStringError::Empty);
        }

        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut signature = None;
        let mut entity_path = None;
        let mut use_development_emulator = false;

        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let value = value.trim();

            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.to_string()),
                "sharedaccesskeyname" => key_name = Some(value.to_string()),
                "sharedaccesskey" => key = Some(value.to_string()),
                "sharedaccesssignature" => signature = Some(value.to_string()),
                "entitypath" if !value.is_empty() => entity_path = Some(value.to_string()),
                "usedevelopmentemulator" => {
                    use_development_emulator = value.eq_ignore_ascii_case("true")
                }
                other => tracing::trace!(segment = other, "Ignoring unknown connection string segment"),
            }
        }

        let raw_endpoint = endpoint.ok_or(ConnectionStringError::MissingEndpoint)?;
        let endpoint = Url::parse(&raw_endpoint)
            .map_err(|_| ConnectionStringError::InvalidEndpoint(raw_endpoint.clone()))?;
        if endpoint.host_str().is_none() || !matches!(endpoint.scheme(), "sb" | "https" | "http") {
            return Err(ConnectionStringError::InvalidEndpoint(raw_endpoint));
        }

        let credential = match (signature, key_name, key) {
            (Some(sig), _, _) => Credential::SharedAccessSignature(sig),
            (None, Some(name), Some(key)) => Credential::SharedAccessKey { name, key },
            // Keyless strings are accepted with the default policy name.
            (None, None, Some(key)) => Credential::SharedAccessKey {
                name: "RootManageSharedAccessKey".to_string(),
                key,
            },
            _ => return Err(ConnectionStringError::MissingCredential),
        };

        Ok(Self {
            endpoint,
            credential,
            entity_path,
            use_development_emulator,
        })
    }

    /// `host[:port]` of the namespace.
    pub fn fully_qualified_namespace(&self) -> String {
        host_with_port(&self.endpoint)
    }
}

/// A pre-built Event Hub connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHubConnection {
    pub fully_qualified_namespace: String,
    pub event_hub_name: String,
    pub credential: Credential,
    pub use_development_emulator: bool,
}

impl EventHubConnection {
    pub fn new(
        fully_qualified_namespace: impl Into<String>,
        event_hub_name: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            fully_qualified_namespace: fully_qualified_namespace.into(),
            event_hub_name: event_hub_name.into(),
            credential,
            use_development_emulator: false,
        }
    }

    /// Build a connection from a connection string, taking the event hub
    /// name from `event_hub_name` or from its `EntityPath`.
    pub fn from_connection_string(
        connection_string: &str,
        event_hub_name: Option<&str>,
    ) -> Result<Self, ConnectionStringError> {
        let parsed = ConnectionString::parse(connection_string)?;
        let event_hub_name = event_hub_name
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| parsed.entity_path.clone())
            .ok_or(ConnectionStringError::MissingEntityPath)?;

        Ok(Self {
            fully_qualified_namespace: parsed.fully_qualified_namespace(),
            event_hub_name,
            credential: parsed.credential,
            use_development_emulator: parsed.use_development_emulator,
        })
    }
}

/// Where a probe's client is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Normalized connection string carrying an `EntityPath`.
    ConnectionString(String),
    Connection(EventHubConnection),
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_connection_string() {
        let parsed = ConnectionString::parse(
            "Endpoint=sb://myns.servicebus.windows.net/;SharedAccessKeyName=listen;SharedAccessKey=abc=;EntityPath=orders",
        )
        .unwrap();

        assert_eq!(parsed.fully_qualified_namespace(), "myns.servicebus.windows.net");
        assert_eq!(parsed.entity_path.as_deref(), Some("orders"));
        assert_eq!(
            parsed.credential,
            Credential::SharedAccessKey {
                name: "listen".into(),
                key: "abc=".into()
            }
        );
        assert!(!parsed.use_development_emulator);
    }

    #[test]
    fn test_parse_keys_case_insensitive_and_emulator() {
        let parsed = ConnectionString::parse(
            "endpoint=sb://localhost:5672;sharedaccesssignature=SharedAccessSignature sr=x&sig=y;UseDevelopmentEmulator=true;",
        )
        .unwrap();

        assert_eq!(parsed.fully_qualified_namespace(), "localhost:5672");
        assert!(matches!(parsed.credential, Credential::SharedAccessSignature(_)));
        assert!(parsed.use_development_emulator);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ConnectionString::parse("  "), Err(ConnectionStringError::Empty));
        assert_eq!(
            ConnectionString::parse("SharedAccessKey=k"),
            Err(ConnectionStringError::MissingEndpoint)
        );
        assert_eq!(
            ConnectionString::parse("Endpoint=sb://x;garbage"),
            Err(ConnectionStringError::MalformedSegment("garbage".into()))
        );
        assert_eq!(
            ConnectionString::parse("Endpoint=sb://x"),
            Err(ConnectionStringError::MissingCredential)
        );
        assert!(matches!(
            ConnectionString::parse("Endpoint=not a url;SharedAccessKey=k"),
            Err(ConnectionStringError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let parsed = ConnectionString::parse("Endpoint=sb://x;SharedAccessKeyName=p;SharedAccessKey=topsecret").unwrap();
        let debug = format!("{:?}", parsed);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_event_hub_connection_from_string() {
        let conn = EventHubConnection::from_connection_string(
            "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKey=k;EntityPath=fromstring",
            None,
        )
        .unwrap();
        assert_eq!(conn.event_hub_name, "fromstring");
        assert_eq!(conn.fully_qualified_namespace, "x.servicebus.windows.net");

        let conn = EventHubConnection::from_connection_string(
            "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKey=k",
            Some("explicit"),
        )
        .unwrap();
        assert_eq!(conn.event_hub_name, "explicit");

        assert_eq!(
            EventHubConnection::from_connection_string("Endpoint=sb://x;SharedAccessKey=k", None),
            Err(ConnectionStringError::MissingEntityPath)
        );
    }
}
