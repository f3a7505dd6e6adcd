//! Observer registration
//!
//! Stores hand out a [`SubscriptionId`] per registered callback and notify
//! every callback on each state transition.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with the new state
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Registry of observers keyed by subscription id
pub struct Observers<T> {
    next_id: AtomicU64,
    observers: RwLock<BTreeMap<SubscriptionId, Observer<T>>>,
}

impl<T> Observers<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1), observers: RwLock::new(BTreeMap::new()) }
    }

    /// Register a callback
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().insert(id, Arc::new(observer));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.write().remove(&id).is_some()
    }

    /// Call every observer in subscription order
    pub fn notify(&self, value: &T) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let observers: Vec<Observer<T>> = self.observers.read().values().cloned().collect();
        for observer in observers {
            observer(value);
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Whether no observers are registered
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("count", &self.len()).finish()
    }
}
