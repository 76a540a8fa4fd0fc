//! In-memory session record.

use crate::error::{SessionError, SessionResult};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sessio_store::BackingStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where a record's values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// No payload was stored under the ID
    Fresh,
    /// Values were decoded from the store
    Loaded,
    /// A stored payload existed but could not be decoded; values start empty
    Corrupted,
}

/// One session's values, tied to an ID and a store lifetime.
///
/// Values live behind a read/write lock so a record can be shared between
/// tasks serving the same session. The lock covers memory only: nothing
/// reaches the store until [`persist`](Self::persist) runs, and two records
/// loaded for the same ID persist last-write-wins.
pub struct SessionRecord {
    id: String,
    values: RwLock<HashMap<String, Value>>,
    lifetime: Duration,
    origin: RecordOrigin,
    store: Arc<dyn BackingStore>,
}

impl SessionRecord {
    pub(crate) fn new(
        id: String,
        values: HashMap<String, Value>,
        lifetime: Duration,
        origin: RecordOrigin,
        store: Arc<dyn BackingStore>,
    ) -> Self {
        Self {
            id,
            values: RwLock::new(values),
            lifetime,
            origin,
            store,
        }
    }

    /// The session ID. Never changes.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Expiry applied on every persist.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn origin(&self) -> RecordOrigin {
        self.origin
    }

    /// Insert or overwrite a value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Serialize `value` and store it under `key`.
    pub fn set_serialized<T: Serialize>(&self, key: impl Into<String>, value: &T) -> SessionResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Get a value, deserialized into `T`.
    ///
    /// Returns `None` when the key is unset or holds a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Copy of every value.
    pub fn get_all(&self) -> HashMap<String, Value> {
        self.values.read().clone()
    }

    /// Remove a value. Missing keys are ignored.
    pub fn delete(&self, key: &str) {
        self.values.write().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Remove every value.
    pub fn clear(&self) {
        self.values.write().clear();
    }

    /// Encode the current values as the payload written to the store.
    pub fn encode(&self) -> SessionResult<Vec<u8>> {
        let values = self.values.read();
        serde_json::to_vec(&*values).map_err(|e| SessionError::Encoding(e.to_string()))
    }

    /// Write all values to the store, resetting the expiry to the record's
    /// lifetime.
    pub async fn persist(&self) -> SessionResult<()> {
        let payload = self.encode()?;
        self.store.set_ex(&self.id, &payload, self.lifetime).await?;
        Ok(())
    }

    /// Garbage-collection hook. Expiry is left to the store's TTL.
    pub fn gc(&self) {}
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("values", &*self.values.read())
            .field("lifetime", &self.lifetime)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Decode a stored payload.
pub(crate) fn decode_values(payload: &[u8]) -> Result<HashMap<String, Value>, serde_json::Error> {
    serde_json::from_slice(payload)
}
