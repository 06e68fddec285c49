//! Shared client registry.
//!
//! One client per [`ConnectionKey`], created lazily and kept for the life of
//! the registry. Inserts are insert-if-absent; reads never wait on inserts
//! for other keys.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::azure::EntityClient;
use crate::health::key::ConnectionKey;

/// Registry of open entity clients, shared by every probe that holds a clone.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<DashMap<ConnectionKey, Arc<dyn EntityClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ConnectionKey) -> Option<Arc<dyn EntityClient>> {
        self.inner.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Insert `client` unless the key is taken.
    ///
    /// Returns the inserted client, or the existing one as the error when
    /// another caller got there first.
    pub fn try_insert(
        &self,
        key: ConnectionKey,
        client: Arc<dyn EntityClient>,
    ) -> Result<Arc<dyn EntityClient>, Arc<dyn EntityClient>> {
        match self.inner.entry(key) {
            Entry::Occupied(existing) => Err(Arc::clone(existing.get())),
            Entry::Vacant(slot) => {
                tracing::debug!(key = %slot.key(), "Registered entity client");
                slot.insert(Arc::clone(&client));
                Ok(client)
            }
        }
    }

    pub fn contains(&self, key: &ConnectionKey) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry").field("clients", &self.inner.len()).finish()
    }
}
