//! Registry of in-flight lockable requests.

use dashmap::DashSet;
use tollgate_core::IdentityKey;

/// Storage used by the submission-lock layer.
pub trait LockStore: Send + Sync {
    /// Marks `key` as in flight.
    ///
    /// Returns `false` without changing anything if the key is already marked.
    /// The check and the mark happen atomically.
    fn try_acquire(&self, key: &IdentityKey) -> bool;

    /// Clears the mark for `key`. Returns `false` if it was not marked.
    fn release(&self, key: &IdentityKey) -> bool;

    /// Check if `key` is marked as in flight.
    fn is_locked(&self, key: &IdentityKey) -> bool;
}

/// In-memory [`LockStore`].
#[derive(Debug, Default)]
pub struct LockRegistry {
    in_flight: DashSet<IdentityKey>,
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently marked.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns `true` if no key is marked.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

impl LockStore for LockRegistry {
    fn try_acquire(&self, key: &IdentityKey) -> bool {
        self.in_flight.insert(key.clone())
    }

    fn release(&self, key: &IdentityKey) -> bool {
        self.in_flight.remove(key).is_some()
    }

    fn is_locked(&self, key: &IdentityKey) -> bool {
        self.in_flight.contains(key)
    }
}
