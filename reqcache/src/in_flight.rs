//! In-flight request registry for deduplication and safe cleanup.
//!
//! Concurrent identical requests must share one network call and observe
//! the same settled value, so pending responses are stored as
//! [`Shared`] futures keyed by [`RequestKey`]. Each entry also carries an
//! identity token: when a request settles it removes its registry entry
//! only if it still owns the key, so a late cleanup can never evict a newer
//! in-flight entry that has since taken ownership.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, Shared};
use reqcache_core::{Body, Error, RequestKey};
use tracing::debug;

/// A pending response shared by every caller deduplicated onto it.
///
/// Polling a clone of this future is polling the same underlying network
/// call; all clones resolve to the same value.
pub type SharedResponse = Shared<BoxFuture<'static, Result<Body, Error>>>;

struct InFlightEntry {
    token: u64,
    future: SharedResponse,
}

/// Tracks the currently-executing network call per request key.
pub struct InFlightRegistry {
    entries: DashMap<RequestKey, InFlightEntry>,
    next_token: AtomicU64,
}

impl InFlightRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        InFlightRegistry {
            entries: DashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Returns the pending response for `key`, if one is in flight.
    pub fn get(&self, key: &RequestKey) -> Option<SharedResponse> {
        self.entries.get(key).map(|entry| entry.future.clone())
    }

    /// Returns the pending response for `key`, registering a new one when
    /// needed.
    ///
    /// With `deduplicate` set and an entry already in flight, the existing
    /// shared future is returned and `make` is never called. Otherwise
    /// `make` receives a fresh identity token and its future takes
    /// ownership of the key, displacing any previous owner (whose
    /// [`complete`](Self::complete) then becomes a no-op).
    pub fn acquire<F>(&self, key: &RequestKey, deduplicate: bool, make: F) -> SharedResponse
    where
        F: FnOnce(u64) -> SharedResponse,
    {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if deduplicate {
                    debug!(key = %key, "joining in-flight request");
                    return occupied.get().future.clone();
                }
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                let future = make(token);
                occupied.insert(InFlightEntry {
                    token,
                    future: future.clone(),
                });
                future
            }
            Entry::Vacant(vacant) => {
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                let future = make(token);
                vacant.insert(InFlightEntry {
                    token,
                    future: future.clone(),
                });
                future
            }
        }
    }

    /// Removes the entry for `key` if `token` still owns it.
    ///
    /// Returns `true` when the entry was removed. A mismatched token means
    /// a newer request took ownership of the key; its entry is left alone.
    pub fn complete(&self, key: &RequestKey, token: u64) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.token == token)
            .is_some()
    }

    /// Returns `true` if a network call is currently in flight for `key`.
    pub fn in_progress(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }
}

impl Default for InFlightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InFlightRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
