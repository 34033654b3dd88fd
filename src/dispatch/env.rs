//! Environment stores consulted by the proxy resolver.
//!
//! The resolver never reads process state directly; it is handed an
//! `EnvStore`. The server uses `SharedEnv`, seeded once from the process
//! environment and then mutated only by the `/set-proxy` control path.

use dashmap::DashMap;
use std::sync::Arc;

/// Key/value store of optional string settings.
pub trait EnvStore: Send + Sync {
    /// Current value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, or remove it when `value` is `None`.
    fn set(&self, key: &str, value: Option<String>);
}

/// Shared handle to an environment store.
pub type SharedEnvStore = Arc<dyn EnvStore>;

/// In-memory store with lock-free reads across tasks.
#[derive(Debug, Clone, Default)]
pub struct SharedEnv {
    inner: Arc<DashMap<String, String>>,
}

impl SharedEnv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build a store from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (k, v) in pairs {
            store.inner.insert(k.into(), v.into());
        }
        store
    }
}

impl EnvStore for SharedEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.inner.insert(key.to_string(), value);
            }
            None => {
                self.inner.remove(key);
            }
        }
    }
}
