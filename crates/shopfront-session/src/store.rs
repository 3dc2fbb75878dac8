//! Per-request session data store.
//!
//! An in-memory key-value bag owned by one session identity, lazily loaded
//! from the durable backend on open and flushed back as a whole snapshot
//! (last-writer-wins) at the end of the request lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use shopfront_cache::keys;
use shopfront_core::result::AppResult;
use shopfront_core::traits::store::TransientStore;

use crate::identity::SessionIdentity;

/// A visitor session: identity plus its mutable key-value bag.
///
/// Cloning is cheap and shares the same in-memory bag; the handle is
/// request-private and never shared across concurrent requests for the
/// same identity. Concurrent requests from one client are last-writer-wins
/// at the durable layer.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// The identity owning this data.
    identity: SessionIdentity,
    /// Durable backend for the session record.
    store: Arc<dyn TransientStore>,
    /// Record TTL, refreshed on every save (sliding expiration).
    ttl: Duration,
    /// The in-memory bag, mutated freely during the request.
    data: Mutex<HashMap<String, Value>>,
}

impl Session {
    /// Opens the session for an identity, loading any prior durable record.
    ///
    /// Absent or corrupt records degrade to an empty bag — every new
    /// identity starts empty, and a corrupt record is accepted data loss
    /// rather than a request-fatal error.
    pub async fn open(
        store: Arc<dyn TransientStore>,
        identity: SessionIdentity,
        ttl: Duration,
    ) -> Self {
        let key = keys::session(identity.as_str());

        let data = match store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<HashMap<String, Value>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(identity = %identity, error = %e, "Corrupt session record, starting empty");
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(identity = %identity, error = %e, "Session record read failed, starting empty");
                HashMap::new()
            }
        };

        Self {
            inner: Arc::new(SessionInner {
                identity,
                store,
                ttl,
                data: Mutex::new(data),
            }),
        }
    }

    /// The identity owning this session.
    pub fn identity(&self) -> &SessionIdentity {
        &self.inner.identity
    }

    /// Returns the value for a key, or `Value::Null` when absent. A missing
    /// key is never an error.
    pub fn get(&self, key: &str) -> Value {
        self.lock().get(key).cloned().unwrap_or(Value::Null)
    }

    /// Returns the value for a key deserialized into a concrete type, or
    /// `None` when the key is absent or the value does not fit the type.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.lock().get(key).cloned()?;
        serde_json::from_value(value).ok()
    }

    /// Overwrites the in-memory value for a key. No durable write happens
    /// until [`Session::save`].
    pub fn set(&self, key: impl Into<String>, value: impl serde::Serialize) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.lock().insert(key.into(), value);
        Ok(())
    }

    /// Whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Removes a key, returning its previous value if any.
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    /// Whether the bag holds no keys.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A copy of the current bag contents.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.lock().clone()
    }

    /// Serializes the whole bag and writes it under the owning identity,
    /// with the record TTL reset to its full duration.
    ///
    /// Invoked once at the end of each request by the session middleware.
    /// Best-effort: callers treat a failure as tolerable soft-state loss
    /// and must not fail the request over it.
    pub async fn save(&self) -> AppResult<()> {
        let snapshot = self.snapshot();
        let payload = serde_json::to_string(&snapshot)?;
        let key = keys::session(self.inner.identity.as_str());

        self.inner.store.set(&key, &payload, self.inner.ttl).await?;
        debug!(identity = %self.inner.identity, keys = snapshot.len(), "Session saved");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // The bag is request-private; a poisoned lock means a handler
        // panicked mid-write, and the soft state is still usable.
        self.inner
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
