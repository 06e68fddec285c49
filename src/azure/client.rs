//! Entity metadata clients.
//!
//! # Responsibilities
//! - Resolve a connection source into an entity URL and credential
//! - Read the entity description with one GET request
//! - Honor the caller's cancellation token
//!
//! # Design Decisions
//! - No retries and no timeout here; the caller owns deadline policy
//! - One `reqwest::Client` is shared by every client a factory creates

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::azure::connection::{ConnectionSource, ConnectionString, ConnectionStringError, Credential};
use crate::azure::sas;
use crate::azure::types::{ClientError, ClientResult, EntityKind, EntityProperties};

/// Upper bound on how much of an error body is kept.
const MAX_ERROR_BODY: usize = 512;

/// A handle able to fetch the metadata of one messaging entity.
///
/// Implementations must stop waiting and return [`ClientError::Cancelled`]
/// once `cancellation` fires.
#[async_trait]
pub trait EntityClient: Send + Sync {
    fn kind(&self) -> EntityKind;

    fn entity_path(&self) -> &str;

    async fn get_properties(&self, cancellation: &CancellationToken) -> ClientResult<EntityProperties>;
}

impl std::fmt::Debug for dyn EntityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityClient")
            .field("kind", &self.kind())
            .field("entity_path", &self.entity_path())
            .finish()
    }
}

/// Builds clients for a connection source.
pub trait ClientFactory: Send + Sync {
    fn create(&self, kind: EntityKind, source: &ConnectionSource) -> ClientResult<Arc<dyn EntityClient>>;
}

/// Client reading entity descriptions over the REST management surface.
pub struct RestEntityClient {
    http: reqwest::Client,
    kind: EntityKind,
    entity_url: Url,
    entity_path: String,
    credential: Credential,
}

impl RestEntityClient {
    pub fn new(http: reqwest::Client, kind: EntityKind, source: &ConnectionSource) -> ClientResult<Self> {
        let (namespace, entity_path, credential, emulator) = match source {
            ConnectionSource::ConnectionString(raw) => {
                let parsed = ConnectionString::parse(raw)?;
                let namespace = parsed.fully_qualified_namespace();
                let path = parsed
                    .entity_path
                    .ok_or(ConnectionStringError::MissingEntityPath)?;
                (namespace, path, parsed.credential, parsed.use_development_emulator)
            }
            ConnectionSource::Connection(conn) => (
                conn.fully_qualified_namespace.clone(),
                conn.event_hub_name.clone(),
                conn.credential.clone(),
                conn.use_development_emulator,
            ),
        };

        let scheme = if emulator { "http" } else { "https" };
        let entity_url = Url::parse(&format!("{}://{}/", scheme, namespace))
            .and_then(|base| base.join(entity_path.trim_start_matches('/')))
            .map_err(|e| ClientError::InvalidUrl(format!("{}/{}: {}", namespace, entity_path, e)))?;

        Ok(Self {
            http,
            kind,
            entity_url,
            entity_path,
            credential,
        })
    }

    pub fn entity_url(&self) -> &Url {
        &self.entity_url
    }
}

#[async_trait]
impl EntityClient for RestEntityClient {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn entity_path(&self) -> &str {
        &self.entity_path
    }

    async fn get_properties(&self, cancellation: &CancellationToken) -> ClientResult<EntityProperties> {
        let token = sas::authorization(&self.credential, self.entity_url.as_str())?;
        let mut url = self.entity_url.clone();
        url.query_pairs_mut().append_pair("api-version", self.kind.api_version());

        let request = self.http.get(url).header(AUTHORIZATION, token).send();
        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ClientError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        let body = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ClientError::Cancelled),
            body = response.text() => body?,
        };

        if !status.is_success() {
            tracing::debug!(
                entity = %self.entity_path,
                status = status.as_u16(),
                "Entity lookup returned non-success status"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        EntityProperties::from_atom(self.kind, &self.entity_path, &body)
    }
}

impl std::fmt::Debug for RestEntityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestEntityClient")
            .field("kind", &self.kind)
            .field("entity_url", &self.entity_url.as_str())
            .finish()
    }
}

/// Factory producing [`RestEntityClient`]s over a shared HTTP client.
#[derive(Debug, Clone, Default)]
pub struct RestClientFactory {
    http: reqwest::Client,
}

impl RestClientFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl ClientFactory for RestClientFactory {
    fn create(&self, kind: EntityKind, source: &ConnectionSource) -> ClientResult<Arc<dyn EntityClient>> {
        let client = RestEntityClient::new(self.http.clone(), kind, source)?;
        tracing::debug!(kind = %kind, url = %client.entity_url(), "Created entity client");
        Ok(Arc::new(client))
    }
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut end = max;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
