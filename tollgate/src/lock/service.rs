use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::ready;
use pin_project::pin_project;
use tollgate_core::{Error, IdentityKey, Interceptable, Upstream};
use tracing::{debug, warn};

use crate::lock::Lock;
use crate::metrics::record_duplicate_submission;
use crate::registry::LockStore;

/// Upstream wrapped by a [`Lock`] layer.
#[derive(Clone)]
pub struct LockService<U> {
    upstream: U,
    lock: Lock,
}

impl<U> LockService<U> {
    /// Wraps `upstream` with `lock`.
    pub fn new(upstream: U, lock: Lock) -> Self {
        Self { upstream, lock }
    }
}

impl<U, Req, Res> Upstream<Req> for LockService<U>
where
    Req: Interceptable,
    U: Upstream<Req, Response = Result<Res, Error>>,
{
    type Response = Result<Res, Error>;
    type Future = LockFuture<U::Future>;

    fn call(&mut self, req: Req) -> Self::Future {
        let flags = req.flags();
        if !flags.lockable {
            return LockFuture::Passthrough {
                inner: self.upstream.call(req),
            };
        }

        let key = self.lock.identity(req.url());
        let store = Arc::clone(self.lock.store());
        if !store.try_acquire(&key) {
            warn!(%key, "Duplicate submission rejected");
            record_duplicate_submission();
            return LockFuture::Rejected { key };
        }
        debug!(%key, deferred = flags.deferred_release, "Submission lock acquired");

        LockFuture::Guarded {
            inner: self.upstream.call(req),
            guard: Some(LockGuard {
                store,
                key,
                release: !flags.deferred_release,
            }),
        }
    }
}

/// Clears the in-flight mark when the request settles or is dropped.
///
/// A guard for a deferred-release request leaves the mark in place; it is
/// cleared by [`Lock::release_lock`].
pub struct LockGuard {
    store: Arc<dyn LockStore>,
    key: IdentityKey,
    release: bool,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.release && self.store.release(&self.key) {
            debug!(key = %self.key, "Submission lock released");
        }
    }
}

/// Future returned by [`LockService`].
#[pin_project(project = LockFutureProj)]
pub enum LockFuture<F> {
    /// The request is not lockable.
    Passthrough {
        #[pin]
        inner: F,
    },
    /// The request holds the lock for its identity.
    Guarded {
        #[pin]
        inner: F,
        guard: Option<LockGuard>,
    },
    /// An identical request is in flight; the transport was not called.
    ///
    /// Every poll yields the same rejection.
    Rejected { key: IdentityKey },
}

impl<F, Res> Future for LockFuture<F>
where
    F: Future<Output = Result<Res, Error>>,
{
    type Output = Result<Res, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            LockFutureProj::Passthrough { inner } => inner.poll(cx),
            LockFutureProj::Guarded { inner, guard } => {
                let result = ready!(inner.poll(cx));
                drop(guard.take());
                Poll::Ready(result)
            }
            LockFutureProj::Rejected { key } => {
                Poll::Ready(Err(Error::DuplicateSubmission(key.clone())))
            }
        }
    }
}
