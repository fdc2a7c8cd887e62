use std::sync::Arc;

use tollgate_core::{Canonicalize, IdentityKey, UrlCanonicalizer};
use tower::Layer;
use tracing::debug;

use crate::lock::service::LockService;
use crate::registry::{LockRegistry, LockStore};

/// Submission-lock layer handle.
///
/// Cloning the handle shares the registry of in-flight submissions.
///
/// ```
/// use tollgate::lock::Lock;
///
/// let lock = Lock::new();
/// assert!(!lock.is_locked("https://example.com/api/submit"));
/// assert!(!lock.release_lock("https://example.com/api/submit"));
/// ```
#[derive(Clone)]
pub struct Lock {
    store: Arc<dyn LockStore>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl std::fmt::Debug for Lock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock").finish_non_exhaustive()
    }
}

impl Lock {
    /// Creates a layer with an empty [`LockRegistry`] and the [`UrlCanonicalizer`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new [`LockBuilder`].
    pub fn builder() -> LockBuilder {
        LockBuilder::new()
    }

    /// Wraps `upstream` with this layer.
    pub fn wrap<U>(&self, upstream: U) -> LockService<U> {
        LockService::new(upstream, self.clone())
    }

    /// Clears the in-flight mark for the canonical form of `url`.
    ///
    /// Idempotent. Returns `true` if a mark was cleared.
    pub fn release_lock(&self, url: &str) -> bool {
        let key = self.identity(url);
        let released = self.store.release(&key);
        debug!(%key, released, "Submission lock released explicitly");
        released
    }

    /// Check if a submission to the canonical form of `url` is in flight.
    pub fn is_locked(&self, url: &str) -> bool {
        self.store.is_locked(&self.identity(url))
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn LockStore> {
        &self.store
    }

    pub(crate) fn identity(&self, url: &str) -> IdentityKey {
        self.canonicalizer.canonicalize(url)
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Layer<U> for Lock {
    type Service = LockService<U>;

    fn layer(&self, upstream: U) -> Self::Service {
        self.wrap(upstream)
    }
}

/// Builder for [`Lock`].
pub struct LockBuilder {
    store: Option<Arc<dyn LockStore>>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl LockBuilder {
    /// Creates a builder using the [`UrlCanonicalizer`].
    pub fn new() -> Self {
        Self {
            store: None,
            canonicalizer: Arc::new(UrlCanonicalizer::new()),
        }
    }

    /// Sets the URL canonicalization.
    pub fn canonicalizer<C>(self, canonicalizer: C) -> Self
    where
        C: Canonicalize + 'static,
    {
        Self {
            canonicalizer: Arc::new(canonicalizer),
            ..self
        }
    }

    /// Uses `store` instead of a fresh [`LockRegistry`].
    pub fn store<S>(self, store: S) -> Self
    where
        S: LockStore + 'static,
    {
        Self {
            store: Some(Arc::new(store)),
            ..self
        }
    }

    /// Builds the [`Lock`] layer.
    pub fn build(self) -> Lock {
        let store: Arc<dyn LockStore> = match self.store {
            Some(store) => store,
            None => Arc::new(LockRegistry::new()),
        };
        Lock {
            store,
            canonicalizer: self.canonicalizer,
        }
    }
}

impl Default for LockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
