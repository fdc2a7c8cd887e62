use std::sync::Arc;

use tollgate_core::{Canonicalize, IdentityKey, UrlCanonicalizer};
use tower::Layer;
use tracing::{debug, warn};

use crate::cancel::service::CancelService;
use crate::metrics::record_cancelled;
use crate::registry::{CancelKey, CancelRegistry, CancelStore};

/// Cancellation layer handle.
///
/// Cloning the handle shares the registry, so [`cancel_all`](Cancel::cancel_all)
/// reaches requests issued through every service built from the clones.
#[derive(Clone)]
pub struct Cancel {
    store: Arc<dyn CancelStore>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl std::fmt::Debug for Cancel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancel")
            .field("pending", &self.store.len())
            .finish()
    }
}

impl Cancel {
    /// Creates a layer with an empty [`CancelRegistry`] and the [`UrlCanonicalizer`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new [`CancelBuilder`].
    pub fn builder() -> CancelBuilder {
        CancelBuilder::new()
    }

    /// Wraps `upstream` with this layer.
    pub fn wrap<U>(&self, upstream: U) -> CancelService<U> {
        CancelService::new(upstream, self.clone())
    }

    /// Cancels every pending cancelable and navigation-scoped request.
    ///
    /// Returns how many requests were cancelled.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.store.cancel_all();
        if cancelled > 0 {
            warn!(cancelled, "Cancelled all pending requests");
        }
        record_cancelled(cancelled);
        cancelled
    }

    /// Cancels the pending cancelable request for the canonical form of `url`.
    ///
    /// Navigation-scoped requests are not reached; use
    /// [`cancel_all`](Cancel::cancel_all) for those.
    pub fn cancel(&self, url: &str) -> bool {
        let key = CancelKey::Repeat(self.identity(url));
        let cancelled = self.store.cancel(&key);
        if cancelled {
            warn!(%key, "Pending request cancelled");
            record_cancelled(1);
        }
        cancelled
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CancelStore> {
        &self.store
    }

    pub(crate) fn identity(&self, url: &str) -> IdentityKey {
        self.canonicalizer.canonicalize(url)
    }

    pub(crate) fn key_for(&self, identity: IdentityKey, scoped: bool) -> (CancelKey, u64) {
        let id = self.store.next_id();
        let key = if scoped {
            CancelKey::Scoped { identity, id }
        } else {
            CancelKey::Repeat(identity)
        };
        debug!(%key, id, "Cancellation key allocated");
        (key, id)
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Layer<U> for Cancel {
    type Service = CancelService<U>;

    fn layer(&self, upstream: U) -> Self::Service {
        self.wrap(upstream)
    }
}

/// Builder for [`Cancel`].
pub struct CancelBuilder {
    store: Option<Arc<dyn CancelStore>>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl CancelBuilder {
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

    /// Uses `store` instead of a fresh [`CancelRegistry`].
    pub fn store<S>(self, store: S) -> Self
    where
        S: CancelStore + 'static,
    {
        Self {
            store: Some(Arc::new(store)),
            ..self
        }
    }

    /// Builds the [`Cancel`] layer.
    pub fn build(self) -> Cancel {
        let store: Arc<dyn CancelStore> = match self.store {
            Some(store) => store,
            None => Arc::new(CancelRegistry::new()),
        };
        Cancel {
            store,
            canonicalizer: self.canonicalizer,
        }
    }
}

impl Default for CancelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
