//! LocalEventRegistry - single-threaded registry for non-`Send` handlers.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::table::HandlerTable;

/// A handler owned by a [`LocalEventRegistry`].
pub type LocalHandler<K, A> = Rc<dyn Fn(&K, &A)>;

/// Single-threaded publish/subscribe registry.
///
/// Same contract as [`EventRegistry`](crate::EventRegistry), but handlers
/// need not be `Send` or `Sync`, so they can share state through
/// `Rc<RefCell<_>>`. The registry itself is neither `Send` nor `Sync`.
///
/// The table is borrowed only for the lookup; handlers run with no borrow
/// outstanding, so they may subscribe, unsubscribe or publish reentrantly.
///
/// # Example
///
/// ```
/// use pubsub_registry::LocalEventRegistry;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let registry: LocalEventRegistry<&str, u32> = LocalEventRegistry::new();
/// let total = Rc::new(RefCell::new(0_u32));
///
/// let t = total.clone();
/// registry.subscribe("add", move |_, n| *t.borrow_mut() += n);
/// registry.publish("add", 5).unwrap();
/// registry.publish("add", 2).unwrap();
///
/// assert_eq!(*total.borrow(), 7);
/// ```
pub struct LocalEventRegistry<K, A> {
    config: RegistryConfig,
    table: RefCell<HandlerTable<K, LocalHandler<K, A>>>,
}

impl<K, A> LocalEventRegistry<K, A>
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
            table: RefCell::new(table),
        }
    }

    /// Returns the registry's configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers `handler` for `key`.
    pub fn subscribe<F>(&self, key: K, handler: F)
    where
        F: Fn(&K, &A) + 'static,
    {
        self.subscribe_handler(key, Rc::new(handler));
    }

    /// Registers an already shared handler for `key`.
    pub fn subscribe_handler(&self, key: K, handler: LocalHandler<K, A>) {
        let (handlers, displaced) = self.table.borrow_mut().insert(key, handler);
        debug!(handlers, replaced = displaced.len(), "local handler subscribed");
    }

    /// Invokes every handler registered for `key`, in registration order.
    ///
    /// Returns the number of handlers invoked; see
    /// [`EventRegistry::publish`](crate::EventRegistry::publish) for the
    /// failure contract.
    pub fn publish(&self, key: K, args: A) -> Result<usize> {
        let snapshot = self.table.borrow().snapshot(&key);
        if snapshot.is_empty() {
            return Ok(0);
        }

        trace!(handlers = snapshot.len(), "publishing local event");
        dispatch(&snapshot, self.config.failure_policy, |handler| {
            handler(&key, &args)
        })
    }

    /// Removes every handler registered for `key`, returning how many.
    pub fn unsubscribe<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let removed = self.table.borrow_mut().remove(key);
        if !removed.is_empty() {
            debug!(removed = removed.len(), "local handlers unsubscribed");
        }
        removed.len()
    }

    /// Returns the number of handlers registered for `key`.
    pub fn handler_count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.table.borrow().count(key)
    }

    /// Returns true if `key` has at least one handler.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.table.borrow().contains(key)
    }

    /// Returns the number of keys with at least one handler.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
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
        self.table.borrow().keys()
    }

    /// Removes every handler for every key, returning how many.
    pub fn clear(&self) -> usize {
        let drained = self.table.borrow_mut().drain();
        let removed: usize = drained.values().map(Vec::len).sum();
        debug!(keys = drained.len(), removed, "local registry cleared");
        removed
    }
}

impl<K, A> Default for LocalEventRegistry<K, A>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
