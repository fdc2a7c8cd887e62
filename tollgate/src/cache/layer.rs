use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use tollgate_core::{Canonicalize, DeepEqual, IdentityKey, ParamsMatcher, UrlCanonicalizer};
use tower::Layer;
use tracing::{debug, warn};

use crate::cache::service::CacheService;
use crate::config::CacheOptions;
use crate::metrics::{record_cache_lookup, record_cache_store};
use crate::predicate::{Never, ShouldCache};
use crate::registry::{CacheEntry, CachePool, CacheStore, SharedResponse, share};

/// Cache layer handle.
///
/// Cloning the handle shares the underlying store, so every service built
/// from clones of one handle reads and writes the same entries.
///
/// ```
/// use std::time::Duration;
/// use tollgate::cache::Cache;
/// use tollgate::config::CacheOptions;
///
/// let cache = Cache::<String>::builder()
///     .options(CacheOptions::default().timeout(Duration::from_secs(30)))
///     .predicate(|body: &String| !body.is_empty())
///     .build();
///
/// assert!(!cache.delete_entry("https://example.com/api/user"));
/// ```
pub struct Cache<Res>
where
    Res: Clone,
{
    store: Arc<dyn CacheStore<Res>>,
    options: CacheOptions,
    predicate: Arc<dyn ShouldCache<Res>>,
    matcher: Arc<dyn ParamsMatcher>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl<Res> Clone for Cache<Res>
where
    Res: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
            predicate: Arc::clone(&self.predicate),
            matcher: Arc::clone(&self.matcher),
            canonicalizer: Arc::clone(&self.canonicalizer),
        }
    }
}

impl<Res> std::fmt::Debug for Cache<Res>
where
    Res: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("options", &self.options)
            .field("entries", &self.store.len())
            .finish()
    }
}

impl<Res> Cache<Res>
where
    Res: Clone + Send + Sync + 'static,
{
    /// Creates a new [`CacheBuilder`].
    pub fn builder() -> CacheBuilder<Res> {
        CacheBuilder::new()
    }

    /// Wraps `upstream` with this cache.
    pub fn wrap<U>(&self, upstream: U) -> CacheService<U, Res> {
        CacheService::new(upstream, self.clone())
    }

    /// Removes the entry stored for the canonical form of `url`.
    ///
    /// Returns `true` if an entry was removed.
    pub fn delete_entry(&self, url: &str) -> bool {
        let key = self.canonicalizer.canonicalize(url);
        let removed = self.store.remove(&key).is_some();
        debug!(%key, removed, "Cache entry deleted");
        removed
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CacheStore<Res>> {
        &self.store
    }

    /// Options the layer was built with.
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub(crate) fn identity(&self, url: &str) -> IdentityKey {
        self.canonicalizer.canonicalize(url)
    }

    /// Returns the stored response if the entry for `key` is a hit for `params`.
    pub(crate) fn lookup(&self, key: &IdentityKey, params: &Value) -> Option<SharedResponse<Res>> {
        let hit = self
            .store
            .get(key)
            .filter(|entry| self.matcher.matches(entry.params(), params))
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.response().clone());
        record_cache_lookup(hit.is_some());
        hit
    }

    /// Stores `response` if it qualifies.
    pub(crate) fn offer(&self, key: IdentityKey, params: Value, response: &Res) -> bool {
        if !self.predicate.should_cache(response) {
            debug!(%key, "Response does not qualify for caching");
            return false;
        }
        if self.options.max_entries == 0 {
            debug!(%key, "Cache has no capacity, response not stored");
            return false;
        }
        let expire_at = Instant::now() + self.options.timeout;
        let entry = CacheEntry::new(key.clone(), expire_at, params, share(response.clone()));
        let evicted = self.store.insert(entry);
        if let Some(evicted) = &evicted {
            warn!(
                max_entries = self.options.max_entries,
                evicted = %evicted.key(),
                %key,
                "Cache is full, evicting the oldest entry"
            );
        }
        record_cache_store(evicted.is_some());
        debug!(%key, "Response cached");
        true
    }
}

impl<U, Res> Layer<U> for Cache<Res>
where
    Res: Clone + Send + Sync + 'static,
{
    type Service = CacheService<U, Res>;

    fn layer(&self, upstream: U) -> Self::Service {
        self.wrap(upstream)
    }
}

impl<Res> Default for Cache<Res>
where
    Res: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder<Res>
where
    Res: Clone,
{
    store: Option<Arc<dyn CacheStore<Res>>>,
    options: CacheOptions,
    predicate: Arc<dyn ShouldCache<Res>>,
    matcher: Arc<dyn ParamsMatcher>,
    canonicalizer: Arc<dyn Canonicalize>,
}

impl<Res> CacheBuilder<Res>
where
    Res: Clone + Send + Sync + 'static,
{
    /// Creates a builder with default options, the [`Never`] predicate,
    /// [`DeepEqual`] parameter matching and the [`UrlCanonicalizer`].
    pub fn new() -> Self {
        Self {
            store: None,
            options: CacheOptions::default(),
            predicate: Arc::new(Never),
            matcher: Arc::new(DeepEqual),
            canonicalizer: Arc::new(UrlCanonicalizer::new()),
        }
    }

    /// Sets timeout and capacity.
    pub fn options(self, options: CacheOptions) -> Self {
        Self { options, ..self }
    }

    /// Sets the predicate deciding which responses are stored.
    pub fn predicate<P>(self, predicate: P) -> Self
    where
        P: ShouldCache<Res> + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            ..self
        }
    }

    /// Sets the parameter comparison.
    pub fn matcher<M>(self, matcher: M) -> Self
    where
        M: ParamsMatcher + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
            ..self
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

    /// Uses `store` instead of a [`CachePool`] sized from the options.
    pub fn store<S>(self, store: S) -> Self
    where
        S: CacheStore<Res> + 'static,
    {
        Self {
            store: Some(Arc::new(store)),
            ..self
        }
    }

    /// Builds the [`Cache`].
    pub fn build(self) -> Cache<Res> {
        let store: Arc<dyn CacheStore<Res>> = match self.store {
            Some(store) => store,
            None => Arc::new(CachePool::new(self.options.max_entries)),
        };
        Cache {
            store,
            options: self.options,
            predicate: self.predicate,
            matcher: self.matcher,
            canonicalizer: self.canonicalizer,
        }
    }
}

impl<Res> Default for CacheBuilder<Res>
where
    Res: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
