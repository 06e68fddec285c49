//! Azure messaging transport subsystem.
//!
//! # Data Flow
//! ```text
//! connection string / EventHubConnection
//!     → connection.rs (parse endpoint, credential, entity path)
//!     → sas.rs (SharedAccessSignature authorization header)
//!     → client.rs (GET entity description over REST)
//!     → EntityProperties or ClientError
//! ```
//!
//! # Security Constraints
//! - Shared access keys never appear in Debug output or logs
//! - Signatures are generated per request with a bounded lifetime

pub mod client;
pub mod connection;
pub mod sas;
pub mod types;

pub use client::{ClientFactory, EntityClient, RestClientFactory, RestEntityClient};
pub use connection::{ConnectionSource, ConnectionString, ConnectionStringError, Credential, EventHubConnection};
pub use types::{ClientError, ClientResult, EntityKind, EntityProperties};
