//! Key to handler-list storage shared by both registry flavors.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::config::KeyPolicy;

/// Ordered handler lists indexed by key.
///
/// Holds no locks and runs no handlers; the registries wrap it in a
/// `Mutex` or `RefCell` and only ever call into it for short, non-reentrant
/// critical sections. A key present in the map always has at least one
/// handler.
#[derive(Debug)]
pub(crate) struct HandlerTable<K, H> {
    entries: HashMap<K, Vec<H>>,
    policy: KeyPolicy,
}

impl<K, H> HandlerTable<K, H>
where
    K: Eq + Hash,
    H: Clone,
{
    pub(crate) fn new(policy: KeyPolicy, capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            policy,
        }
    }

    /// Adds a handler under `key`.
    ///
    /// Returns the key's new handler count and, under [`KeyPolicy::Replace`],
    /// the handlers that were displaced.
    pub(crate) fn insert(&mut self, key: K, handler: H) -> (usize, Vec<H>) {
        let handlers = self.entries.entry(key).or_default();
        let displaced = match self.policy {
            KeyPolicy::Accumulate => Vec::new(),
            KeyPolicy::Replace => std::mem::take(handlers),
        };
        handlers.push(handler);
        (handlers.len(), displaced)
    }

    /// Clones the handler list for `key` so it can be iterated unlocked.
    pub(crate) fn snapshot<Q>(&self, key: &Q) -> Vec<H>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Removes every handler for `key`, returning them.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Vec<H>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key).unwrap_or_default()
    }

    pub(crate) fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key).map_or(0, Vec::len)
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of keys with at least one handler.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.entries.keys().cloned().collect()
    }

    /// Takes every entry out of the table, leaving it empty.
    pub(crate) fn drain(&mut self) -> HashMap<K, Vec<H>> {
        std::mem::take(&mut self.entries)
    }
}
