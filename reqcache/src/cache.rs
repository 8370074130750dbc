//! In-memory response cache with per-key update notification.
//!
//! The cache stores whole response bodies keyed by [`RequestKey`] - it does
//! not normalize entities or link entries to each other. There is no TTL
//! and no eviction: an entry lives until it is overwritten, removed, or the
//! process ends. Every write fans out synchronously to that key's
//! subscribers, whether it came from the network path or from a manual
//! override.

use dashmap::DashMap;
use reqcache_core::{Body, RequestKey};

use crate::notify::{ListenerRegistry, Subscription};

/// Key-value store of response bodies with per-key subscriber fan-out.
///
/// Cloning shares the underlying store.
#[derive(Clone)]
pub struct ResponseCache {
    entries: DashMap<RequestKey, Body>,
    subscribers: ListenerRegistry<RequestKey, Body>,
}

impl ResponseCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        ResponseCache {
            entries: DashMap::new(),
            subscribers: ListenerRegistry::new(),
        }
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns a clone of the entry for `key`, if present.
    pub fn get(&self, key: &RequestKey) -> Option<Body> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Stores `body` under `key`, overwriting any previous entry, and
    /// notifies the key's subscribers in registration order.
    pub fn insert(&self, key: &RequestKey, body: Body) {
        self.entries.insert(key.clone(), body.clone());
        self.subscribers.notify(key, &body);
    }

    /// Removes and returns the entry for `key`, if present.
    ///
    /// Removal does not notify subscribers; only writes do.
    pub fn remove(&self, key: &RequestKey) -> Option<Body> {
        self.entries.remove(key).map(|(_, body)| body)
    }

    /// Registers a listener invoked on every write for `key`.
    pub fn subscribe<F>(&self, key: RequestKey, listener: F) -> Subscription
    where
        F: Fn(&Body) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(key, listener)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
