//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use messaging_health::azure::{
    ClientError, ClientFactory, ClientResult, ConnectionSource, EntityClient, EntityKind, EntityProperties,
};
use messaging_health::health::{ClientRegistry, ConnectionKey};

/// What mock clients do when asked for properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behavior {
    #[default]
    Succeed,
    /// Answer with an HTTP status error.
    Fail(u16),
    /// Wait until cancelled.
    Hang,
}

pub struct MockClient {
    kind: EntityKind,
    path: String,
    behavior: Arc<Mutex<Behavior>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl EntityClient for MockClient {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn entity_path(&self) -> &str {
        &self.path
    }

    async fn get_properties(&self, cancellation: &CancellationToken) -> ClientResult<EntityProperties> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            Behavior::Succeed => Ok(EntityProperties {
                kind: self.kind,
                path: self.path.clone(),
                status: Some("Active".into()),
                updated: None,
            }),
            Behavior::Fail(status) => Err(ClientError::Status {
                status,
                body: "mock failure".into(),
            }),
            Behavior::Hang => {
                cancellation.cancelled().await;
                Err(ClientError::Cancelled)
            }
        }
    }
}

/// Factory counting how many clients it builds.
#[derive(Default)]
pub struct MockFactory {
    created: AtomicUsize,
    calls: Arc<AtomicUsize>,
    behavior: Arc<Mutex<Behavior>>,
    fail_create: Mutex<bool>,
    /// When set, a rival client is registered under this key right before
    /// `create` returns, as if another caller won the race.
    race: Mutex<Option<(ClientRegistry, ConnectionKey)>>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn fail_create(&self, fail: bool) {
        *self.fail_create.lock().unwrap() = fail;
    }

    pub fn race_on_create(&self, registry: ClientRegistry, key: ConnectionKey) {
        *self.race.lock().unwrap() = Some((registry, key));
    }

    fn client(&self, kind: EntityKind, path: String) -> Arc<MockClient> {
        Arc::new(MockClient {
            kind,
            path,
            behavior: self.behavior.clone(),
            calls: self.calls.clone(),
        })
    }
}

impl ClientFactory for MockFactory {
    fn create(&self, kind: EntityKind, source: &ConnectionSource) -> ClientResult<Arc<dyn EntityClient>> {
        if *self.fail_create.lock().unwrap() {
            return Err(ClientError::InvalidUrl("mock create failure".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);

        let path = match source {
            ConnectionSource::ConnectionString(s) => s.rsplit("EntityPath=").next().unwrap_or_default().to_string(),
            ConnectionSource::Connection(c) => c.event_hub_name.clone(),
        };

        if let Some((registry, key)) = self.race.lock().unwrap().take() {
            let rival: Arc<dyn EntityClient> = self.client(kind, format!("rival-{}", path));
            let _ = registry.try_insert(key, rival);
        }

        Ok(self.client(kind, path))
    }
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` receives the raw request head and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }

                        let (status, body) = f(String::from_utf8_lossy(&head).into_owned()).await;
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/atom+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Atom entry the service returns for an existing entity.
pub fn atom_entry(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><entry xmlns="http://www.w3.org/2005/Atom"><title type="text">{}</title><updated>2024-01-01T00:00:00Z</updated><content type="application/xml"><EventHubDescription><Status>Active</Status></EventHubDescription></content></entry>"#,
        name
    )
}

/// Empty feed the service returns for a missing entity.
pub fn atom_empty_feed() -> String {
    r#"<feed xmlns="http://www.w3.org/2005/Atom"><title type="text">Publicly Listed Services</title></feed>"#.to_string()
}

/// Emulator connection string pointing at `addr`.
pub fn emulator_connection_string(addr: SocketAddr) -> String {
    format!(
        "Endpoint=sb://{};SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=SAS_KEY_VALUE;UseDevelopmentEmulator=true",
        addr
    )
}
