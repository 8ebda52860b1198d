//! EventRegistry - thread-safe key to handler registry.
//!
//! Key Rust patterns in use:
//! - `Mutex<T>` serializing every lookup and mutation of the handler table
//! - `Arc<dyn Fn>` handlers, so a publish can snapshot the list and drop
//!   the lock before any user code runs

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::table::HandlerTable;

/// A handler owned by an [`EventRegistry`].
pub type Handler<K, A> = Arc<dyn Fn(&K, &A) + Send + Sync>;

/// Thread-safe publish/subscribe registry.
///
/// Maps a key to the handlers registered for it, in registration order.
/// `A` is the argument type every handler of this registry accepts; use a
/// tuple for several arguments.
///
/// # Dispatch contract
///
/// - **Shared arguments**: `publish` takes the arguments by value and hands
///   every handler `&A`, so no handler can consume them before the next one
///   runs.
/// - **Snapshot**: the handler list is cloned under the lock, then the lock
///   is released before the first handler runs. Handlers may call
///   `subscribe`, `unsubscribe` or `publish` on the same registry; the
///   changes apply to later publishes only.
/// - **Late delivery**: a publish already in flight on another thread keeps
///   its snapshot. A handler removed by `unsubscribe` or `clear` may still be
///   invoked by that publish after the removal has returned, and it is
///   dropped only once that publish finishes with it.
/// - **Failures**: see [`FailurePolicy`](crate::FailurePolicy). By default a
///   panicking handler is isolated and reported in the returned error after
///   all other handlers have run.
///
/// # Example
///
/// ```
/// use pubsub_registry::EventRegistry;
/// use std::sync::{Arc, Mutex};
///
/// let registry: EventRegistry<u32, i64> = EventRegistry::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = log.clone();
/// registry.subscribe(1, move |key, arg| sink.lock().unwrap().push((*key, *arg)));
///
/// assert_eq!(registry.publish(1, 42).unwrap(), 1);
/// assert_eq!(*log.lock().unwrap(), vec![(1, 42)]);
///
/// registry.unsubscribe(&1);
/// assert_eq!(registry.publish(1, 43).unwrap(), 0);
/// ```
pub struct EventRegistry<K, A> {
    config: RegistryConfig,
    table: Mutex<HandlerTable<K, Handler<K, A>>>,
}

impl<K, A> EventRegistry<K, A>
where
    K: Eq + Hash,
{
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        let table = HandlerTable::new(config.key_policy, config.initial_capacity);
        Self {
            config,
            table: Mutex::new(table),
        }
    }

    /// Returns the registry's configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Acquires the table lock.
    ///
    /// Handlers never run under the lock. The only caller code that does is
    /// the key's `Hash`/`Eq`, and it runs while the map is probed, before
    /// anything is inserted or removed, so a table poisoned by a panicking
    /// key is still consistent and is used as-is.
    fn table(&self) -> MutexGuard<'_, HandlerTable<K, Handler<K, A>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for `key`.
    ///
    /// With [`KeyPolicy::Accumulate`](crate::KeyPolicy::Accumulate) the handler
    /// is appended after any existing ones; with
    /// [`KeyPolicy::Replace`](crate::KeyPolicy::Replace) it becomes the key's
    /// only handler.
    pub fn subscribe<F>(&self, key: K, handler: F)
    where
        F: Fn(&K, &A) + Send + Sync + 'static,
    {
        self.subscribe_handler(key, Arc::new(handler));
    }

    /// Registers an already shared handler for `key`.
    ///
    /// The same `Arc` may be registered under several keys.
    pub fn subscribe_handler(&self, key: K, handler: Handler<K, A>) {
        let (handlers, displaced) = self.table().insert(key, handler);
        debug!(handlers, replaced = displaced.len(), "handler subscribed");
    }

    /// Invokes every handler registered for `key`, in registration order.
    ///
    /// Blocks until all of them have returned. Publishing a key with no
    /// handlers is a no-op and returns `Ok(0)`.
    ///
    /// # Returns
    ///
    /// The number of handlers invoked, or
    /// [`PublishError::HandlersFailed`](crate::PublishError::HandlersFailed)
    /// listing the handlers that panicked under the isolate policy.
    ///
    /// # Panics
    ///
    /// Under [`FailurePolicy::Propagate`](crate::FailurePolicy::Propagate), a
    /// handler panic unwinds out of this call and the remaining handlers for
    /// this publish are skipped.
    pub fn publish(&self, key: K, args: A) -> Result<usize> {
        let snapshot = self.table().snapshot(&key);
        if snapshot.is_empty() {
            return Ok(0);
        }

        trace!(handlers = snapshot.len(), "publishing event");
        dispatch(&snapshot, self.config.failure_policy, |handler| {
            handler(&key, &args)
        })
    }

    /// Removes every handler registered for `key`.
    ///
    /// The removed handlers are dropped without being invoked. Calling this
    /// for a key with no handlers does nothing.
    ///
    /// # Returns
    ///
    /// The number of handlers removed.
    pub fn unsubscribe<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        // Dropped after the guard so handler destructors run unlocked.
        let removed = self.table().remove(key);
        if !removed.is_empty() {
            debug!(removed = removed.len(), "handlers unsubscribed");
        }
        removed.len()
    }

    /// Returns the number of handlers registered for `key`.
    pub fn handler_count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.table().count(key)
    }

    /// Returns true if `key` has at least one handler.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.table().contains(key)
    }

    /// Returns the number of keys with at least one handler.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the keys that currently have handlers, in no particular order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.table().keys()
    }

    /// Removes every handler for every key.
    ///
    /// # Returns
    ///
    /// The total number of handlers removed.
    pub fn clear(&self) -> usize {
        let drained = self.table().drain();
        let removed: usize = drained.values().map(Vec::len).sum();
        debug!(keys = drained.len(), removed, "registry cleared");
        removed
    }
}

impl<K, A> Default for EventRegistry<K, A>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
