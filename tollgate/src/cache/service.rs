use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::ready;
use pin_project::pin_project;
use serde_json::Value;
use tollgate_core::{Error, IdentityKey, Interceptable, Upstream, match_params};
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::registry::SharedResponse;

/// Upstream wrapped by a [`Cache`] layer.
pub struct CacheService<U, Res>
where
    Res: Clone,
{
    upstream: U,
    cache: Cache<Res>,
}

impl<U, Res> CacheService<U, Res>
where
    Res: Clone,
{
    /// Wraps `upstream` with `cache`.
    pub fn new(upstream: U, cache: Cache<Res>) -> Self {
        Self { upstream, cache }
    }
}

impl<U, Res> Clone for CacheService<U, Res>
where
    U: Clone,
    Res: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<U, Req, Res> Upstream<Req> for CacheService<U, Res>
where
    Req: Interceptable,
    U: Upstream<Req, Response = Result<Res, Error>>,
    Res: Clone + Send + Sync + 'static,
{
    type Response = Result<Res, Error>;
    type Future = CacheFuture<U::Future, Res>;

    fn call(&mut self, req: Req) -> Self::Future {
        let flags = req.flags();
        if !flags.cacheable || flags.locked {
            if flags.cacheable {
                warn!(url = req.url(), "Request is locked, caching skipped");
            }
            return CacheFuture::Passthrough {
                inner: self.upstream.call(req),
            };
        }

        let key = self.cache.identity(req.url());
        let params = match_params(&req);

        if flags.force_refresh {
            debug!(%key, "Cache refresh forced");
        } else if let Some(response) = self.cache.lookup(&key, &params) {
            debug!(%key, "Cache hit");
            return CacheFuture::Hit { response };
        } else {
            debug!(%key, "Cache miss");
        }

        CacheFuture::Miss {
            inner: self.upstream.call(req),
            pending: Some(PendingEntry {
                cache: self.cache.clone(),
                key,
                params,
            }),
        }
    }
}

/// Everything needed to store a response once the transport produced it.
pub struct PendingEntry<Res>
where
    Res: Clone,
{
    cache: Cache<Res>,
    key: IdentityKey,
    params: Value,
}

/// Future returned by [`CacheService`].
#[pin_project(project = CacheFutureProj)]
pub enum CacheFuture<F, Res>
where
    Res: Clone,
{
    /// Caching does not apply to the request.
    Passthrough {
        #[pin]
        inner: F,
    },
    /// A stored response is being replayed.
    Hit {
        #[pin]
        response: SharedResponse<Res>,
    },
    /// The transport was called; a successful qualifying response is stored.
    Miss {
        #[pin]
        inner: F,
        pending: Option<PendingEntry<Res>>,
    },
}

impl<F, Res> Future for CacheFuture<F, Res>
where
    F: Future<Output = Result<Res, Error>>,
    Res: Clone + Send + Sync + 'static,
{
    type Output = Result<Res, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            CacheFutureProj::Passthrough { inner } => inner.poll(cx),
            CacheFutureProj::Hit { response } => response.poll(cx),
            CacheFutureProj::Miss { inner, pending } => {
                let result = ready!(inner.poll(cx));
                // Failed responses never reach the store.
                if let (Ok(response), Some(entry)) = (&result, pending.take()) {
                    entry.cache.offer(entry.key, entry.params, response);
                }
                Poll::Ready(result)
            }
        }
    }
}
