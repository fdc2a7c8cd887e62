//! Interception middlewares for reqwest-middleware.

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tollgate::cache::Cache;
use tollgate::cancel::Cancel;
use tollgate::lock::Lock;
use tollgate_core::{RequestFlags, Upstream};
use tracing::{debug, warn};

use crate::error::into_middleware_error;
use crate::request::InterceptedRequest;
use crate::response::CapturedResponse;
use crate::upstream::{CapturingUpstream, ReqwestUpstream};

/// Cache middleware for reqwest-middleware.
///
/// Replays a stored response for a repeated request flagged `cacheable` with
/// the same parameters. The response body is buffered on a miss so it can be
/// stored; responses are only stored when the [`Cache`] predicate accepts them.
/// Requests that are not cacheable, or are `locked`, go to the next middleware
/// untouched and keep their streaming body and URL.
///
/// ```no_run
/// use reqwest_middleware::ClientBuilder;
/// use tollgate::cache::Cache;
/// use tollgate_reqwest::{CacheMiddleware, JsonPredicate};
///
/// let cache = Cache::builder()
///     .predicate(JsonPredicate::new(|body| body["code"] == 0))
///     .build();
/// let client = ClientBuilder::new(reqwest::Client::new())
///     .with(CacheMiddleware::new(cache))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct CacheMiddleware {
    cache: Cache<CapturedResponse>,
}

impl CacheMiddleware {
    /// Create a new cache middleware.
    pub fn new(cache: Cache<CapturedResponse>) -> Self {
        Self { cache }
    }

    /// The cache layer backing this middleware.
    pub fn cache(&self) -> &Cache<CapturedResponse> {
        &self.cache
    }

    /// Removes the entry stored for the canonical form of `url`.
    pub fn delete_entry(&self, url: &str) -> bool {
        self.cache.delete_entry(url)
    }
}

impl From<Cache<CapturedResponse>> for CacheMiddleware {
    fn from(cache: Cache<CapturedResponse>) -> Self {
        Self::new(cache)
    }
}

#[async_trait]
impl Middleware for CacheMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let flags = extensions
            .get::<RequestFlags>()
            .copied()
            .unwrap_or_default();
        if !flags.cacheable || flags.locked {
            if flags.cacheable {
                warn!(url = %req.url(), "Request is locked, caching skipped");
            }
            debug!(url = %req.url(), "Caching does not apply, passing request through");
            return next.run(req, extensions).await;
        }

        debug!(url = %req.url(), "Intercepting cacheable request");
        let request = InterceptedRequest::with_flags(req, flags);
        let mut service = self
            .cache
            .wrap(CapturingUpstream::new(next, extensions.clone()));

        let response = service.call(request).await.map_err(into_middleware_error)?;
        Ok(response.into_response())
    }
}

/// Cancellation middleware for reqwest-middleware.
///
/// A request flagged `cancelable` cancels the pending request with the same
/// canonical URL. Requests flagged `cancel_on_navigation_only` are cancelled
/// by [`cancel_all`](CancelMiddleware::cancel_all).
#[derive(Debug, Clone, Default)]
pub struct CancelMiddleware {
    cancel: Cancel,
}

impl CancelMiddleware {
    /// Create a new cancellation middleware.
    pub fn new(cancel: Cancel) -> Self {
        Self { cancel }
    }

    /// The cancellation layer backing this middleware.
    pub fn cancel(&self) -> &Cancel {
        &self.cancel
    }

    /// Cancels every pending cancelable request. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        self.cancel.cancel_all()
    }
}

impl From<Cancel> for CancelMiddleware {
    fn from(cancel: Cancel) -> Self {
        Self::new(cancel)
    }
}

#[async_trait]
impl Middleware for CancelMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let request = InterceptedRequest::new(req, extensions);
        let mut service = self
            .cancel
            .wrap(ReqwestUpstream::new(next, extensions.clone()));

        service.call(request).await.map_err(into_middleware_error)
    }
}

/// Submission-lock middleware for reqwest-middleware.
///
/// Rejects a request flagged `lockable` while an identical one is in flight.
#[derive(Debug, Clone, Default)]
pub struct LockMiddleware {
    lock: Lock,
}

impl LockMiddleware {
    /// Create a new submission-lock middleware.
    pub fn new(lock: Lock) -> Self {
        Self { lock }
    }

    /// The submission-lock layer backing this middleware.
    pub fn lock(&self) -> &Lock {
        &self.lock
    }

    /// Clears the in-flight mark for the canonical form of `url`.
    pub fn release_lock(&self, url: &str) -> bool {
        self.lock.release_lock(url)
    }

    /// Check if a submission to the canonical form of `url` is in flight.
    pub fn is_locked(&self, url: &str) -> bool {
        self.lock.is_locked(url)
    }
}

impl From<Lock> for LockMiddleware {
    fn from(lock: Lock) -> Self {
        Self::new(lock)
    }
}

#[async_trait]
impl Middleware for LockMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let request = InterceptedRequest::new(req, extensions);
        let mut service = self.lock.wrap(ReqwestUpstream::new(next, extensions.clone()));

        service.call(request).await.map_err(into_middleware_error)
    }
}
