//! Listener registries and subscription handles.
//!
//! Cache updates and engine errors are broadcast to registered listeners.
//! Listeners for a given key are invoked synchronously, in registration
//! order, each time a value is published for that key. A [`Subscription`]
//! handle is returned on registration; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the listener.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registered<T> {
    id: u64,
    listener: Listener<T>,
}

struct RegistryInner<K, T>
where
    K: Eq + Hash,
{
    listeners: DashMap<K, Vec<Registered<T>>>,
    next_id: AtomicU64,
}

/// Fan-out registry of listeners grouped by key.
///
/// Shared across clones; used with `RequestKey` keys for cache updates and
/// with `()` for the process-wide error channel.
pub(crate) struct ListenerRegistry<K, T>
where
    K: Eq + Hash,
{
    inner: Arc<RegistryInner<K, T>>,
}

impl<K, T> Clone for ListenerRegistry<K, T>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        ListenerRegistry {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T> ListenerRegistry<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: 'static,
{
    pub(crate) fn new() -> Self {
        ListenerRegistry {
            inner: Arc::new(RegistryInner {
                listeners: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a listener under `key` and returns its subscription handle.
    pub(crate) fn subscribe<F>(&self, key: K, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .entry(key.clone())
            .or_default()
            .push(Registered {
                id,
                listener: Arc::new(listener),
            });

        let registry = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = registry.upgrade() {
                    if let Some(mut registered) = inner.listeners.get_mut(&key) {
                        registered.retain(|entry| entry.id != id);
                        let empty = registered.is_empty();
                        drop(registered);
                        if empty {
                            inner.listeners.remove_if(&key, |_, entries| entries.is_empty());
                        }
                    }
                }
            })),
        }
    }

    /// Invokes every listener registered under `key`, in registration order.
    ///
    /// Listener handles are cloned out of the map before invocation so a
    /// listener can re-enter the registry (subscribe, unsubscribe, publish)
    /// without deadlocking.
    pub(crate) fn notify(&self, key: &K, value: &T) {
        let listeners: Vec<Listener<T>> = match self.inner.listeners.get(key) {
            Some(registered) => registered.iter().map(|entry| entry.listener.clone()).collect(),
            None => return,
        };
        for listener in listeners {
            listener(value);
        }
    }
}

/// Handle to a registered listener.
///
/// The listener stays registered for as long as this handle is alive;
/// dropping the handle unsubscribes it. [`Subscription::unsubscribe`] does
/// the same with an explicit name at the call site.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Removes the listener from its registry.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
