//! Registry of cancellation handles for in-flight requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use futures::future::AbortHandle;
use tollgate_core::IdentityKey;

/// Key for identifying a cancellation handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CancelKey {
    /// Keyed by the canonical URL; a repeated request supersedes the pending one.
    Repeat(IdentityKey),
    /// Keyed by the canonical URL plus a per-request id; only bulk
    /// cancellation reaches it.
    Scoped {
        /// Canonical URL of the request.
        identity: IdentityKey,
        /// Unique identifier within the registry.
        id: u64,
    },
}

impl CancelKey {
    /// Canonical URL of the request behind this key.
    pub fn identity(&self) -> &IdentityKey {
        match self {
            Self::Repeat(identity) | Self::Scoped { identity, .. } => identity,
        }
    }
}

impl fmt::Display for CancelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repeat(identity) => write!(f, "{identity}"),
            Self::Scoped { identity, id } => write!(f, "{identity}-{id}"),
        }
    }
}

/// Handle aborting one in-flight request.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    id: u64,
    abort: AbortHandle,
}

impl CancelHandle {
    /// Creates a handle for the request with the given registry id.
    pub fn new(id: u64, abort: AbortHandle) -> Self {
        Self { id, abort }
    }

    /// Registry id of the request owning this handle.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Abort the request.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Returns `true` once the request was aborted.
    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }
}

/// Storage used by the cancellation layer.
///
/// Implementations must make each method a single critical section so a
/// superseded request is aborted before its successor is dispatched.
pub trait CancelStore: Send + Sync {
    /// Allocates a registry-unique request id.
    fn next_id(&self) -> u64;

    /// Registers `handle` under `key`.
    ///
    /// A handle already registered under the same key is cancelled, removed
    /// and returned.
    fn register(&self, key: CancelKey, handle: CancelHandle) -> Option<CancelHandle>;

    /// Removes the handle under `key` if it still belongs to request `id`.
    ///
    /// Returns `false` when the handle was already removed or superseded.
    fn deregister(&self, key: &CancelKey, id: u64) -> bool;

    /// Cancels and removes the handle under `key`.
    fn cancel(&self, key: &CancelKey) -> bool;

    /// Cancels and removes every handle. Returns how many were cancelled.
    fn cancel_all(&self) -> usize;

    /// Number of registered handles.
    fn len(&self) -> usize;

    /// Returns `true` if no handle is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`CancelStore`].
#[derive(Debug, Default)]
pub struct CancelRegistry {
    handles: DashMap<CancelKey, CancelHandle>,
    id_counter: AtomicU64,
}

impl CancelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a handle is registered under `key`.
    pub fn contains(&self, key: &CancelKey) -> bool {
        self.handles.contains_key(key)
    }
}

impl CancelStore for CancelRegistry {
    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn register(&self, key: CancelKey, handle: CancelHandle) -> Option<CancelHandle> {
        let previous = self.handles.insert(key, handle)?;
        previous.cancel();
        Some(previous)
    }

    fn deregister(&self, key: &CancelKey, id: u64) -> bool {
        self.handles
            .remove_if(key, |_, handle| handle.id == id)
            .is_some()
    }

    fn cancel(&self, key: &CancelKey) -> bool {
        match self.handles.remove(key) {
            Some((_, handle)) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        self.handles.retain(|_, handle| {
            handle.cancel();
            cancelled += 1;
            false
        });
        cancelled
    }

    fn len(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(registry: &CancelRegistry) -> CancelHandle {
        let (abort, _registration) = AbortHandle::new_pair();
        CancelHandle::new(registry.next_id(), abort)
    }

    #[test]
    fn test_register_supersedes_previous() {
        let registry = CancelRegistry::new();
        let key = CancelKey::Repeat(IdentityKey::new("/api/user"));
        let first = handle(&registry);
        let second = handle(&registry);

        assert!(registry.register(key.clone(), first.clone()).is_none());
        let previous = registry.register(key.clone(), second.clone()).unwrap();

        assert_eq!(previous.id(), first.id());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deregister_ignores_superseded_owner() {
        let registry = CancelRegistry::new();
        let key = CancelKey::Repeat(IdentityKey::new("/api/user"));
        let first = handle(&registry);
        let second = handle(&registry);
        registry.register(key.clone(), first.clone());
        registry.register(key.clone(), second.clone());

        assert!(!registry.deregister(&key, first.id()));
        assert!(registry.contains(&key));
        assert!(registry.deregister(&key, second.id()));
        assert!(!registry.deregister(&key, second.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let registry = CancelRegistry::new();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let handle = handle(&registry);
                let key = CancelKey::Scoped {
                    identity: IdentityKey::new("/api/list"),
                    id: handle.id(),
                };
                registry.register(key, handle.clone());
                handle
            })
            .collect();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.cancel_all(), 3);
        assert!(registry.is_empty());
        assert!(handles.iter().all(CancelHandle::is_cancelled));
    }

    #[test]
    fn test_scoped_key_display() {
        let key = CancelKey::Scoped {
            identity: IdentityKey::new("/api/list"),
            id: 7,
        };
        assert_eq!(key.to_string(), "/api/list-7");
        assert_eq!(key.identity(), &IdentityKey::new("/api/list"));
    }
}
