use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable, Aborted};
use futures::ready;
use pin_project::pin_project;
use tollgate_core::{Error, IdentityKey, Interceptable, Upstream};
use tracing::{debug, warn};

use crate::cancel::Cancel;
use crate::metrics::record_cancelled;
use crate::registry::{CancelHandle, CancelKey, CancelStore};

/// Upstream wrapped by a [`Cancel`] layer.
#[derive(Clone)]
pub struct CancelService<U> {
    upstream: U,
    cancel: Cancel,
}

impl<U> CancelService<U> {
    /// Wraps `upstream` with `cancel`.
    pub fn new(upstream: U, cancel: Cancel) -> Self {
        Self { upstream, cancel }
    }
}

impl<U, Req, Res> Upstream<Req> for CancelService<U>
where
    Req: Interceptable,
    U: Upstream<Req, Response = Result<Res, Error>>,
{
    type Response = Result<Res, Error>;
    type Future = CancelFuture<U::Future>;

    fn call(&mut self, req: Req) -> Self::Future {
        let flags = req.flags();
        if !flags.wants_cancellation() || flags.locked {
            if flags.wants_cancellation() {
                warn!(url = req.url(), "Request is locked, cancellation skipped");
            }
            return CancelFuture::Passthrough {
                inner: self.upstream.call(req),
            };
        }

        let identity = self.cancel.identity(req.url());
        // Navigation-only requests get a unique key so siblings never collide.
        let scoped = !flags.cancelable;
        let (key, id) = self.cancel.key_for(identity.clone(), scoped);

        let (abort, registration) = AbortHandle::new_pair();
        let store = Arc::clone(self.cancel.store());
        if let Some(previous) = store.register(key.clone(), CancelHandle::new(id, abort)) {
            warn!(%key, superseded = previous.id(), "Pending request cancelled by a newer one");
            record_cancelled(1);
        }

        CancelFuture::Guarded {
            inner: Abortable::new(self.upstream.call(req), registration),
            guard: Some(CancelGuard { store, key, id }),
            identity,
        }
    }
}

/// Deregisters a request's handle once the request settles or is dropped.
pub struct CancelGuard {
    store: Arc<dyn CancelStore>,
    key: CancelKey,
    id: u64,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.store.deregister(&self.key, self.id) {
            debug!(key = %self.key, "Cancellation handle released");
        }
    }
}

/// Future returned by [`CancelService`].
#[pin_project(project = CancelFutureProj)]
pub enum CancelFuture<F> {
    /// Cancellation does not apply to the request.
    Passthrough {
        #[pin]
        inner: F,
    },
    /// The request can be aborted through the registry.
    Guarded {
        #[pin]
        inner: Abortable<F>,
        guard: Option<CancelGuard>,
        identity: IdentityKey,
    },
}

impl<F, Res> Future for CancelFuture<F>
where
    F: Future<Output = Result<Res, Error>>,
{
    type Output = Result<Res, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            CancelFutureProj::Passthrough { inner } => inner.poll(cx),
            CancelFutureProj::Guarded {
                inner,
                guard,
                identity,
            } => {
                let result = ready!(inner.poll(cx));
                drop(guard.take());
                match result {
                    Ok(result) => Poll::Ready(result),
                    Err(Aborted) => {
                        debug!(%identity, "Request cancelled");
                        Poll::Ready(Err(Error::Cancelled(identity.clone())))
                    }
                }
            }
        }
    }
}
