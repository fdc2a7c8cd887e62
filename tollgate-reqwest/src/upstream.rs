//! Upstream wrappers for reqwest-middleware's Next type.

use std::future::Future;
use std::pin::Pin;

use http::Extensions;
use reqwest_middleware::Next;
use tollgate_core::{Error, Upstream};

use crate::error::from_middleware_error;
use crate::request::InterceptedRequest;
use crate::response::CapturedResponse;

/// Upstream that bridges reqwest-middleware's `Next<'a>` to tollgate's `Upstream` trait.
///
/// Used by the cancellation and submission-lock middlewares, which hand the
/// response back to the caller unchanged.
pub struct ReqwestUpstream<'a> {
    next: Next<'a>,
    extensions: Extensions,
}

impl<'a> ReqwestUpstream<'a> {
    /// Create a new upstream wrapper.
    pub fn new(next: Next<'a>, extensions: Extensions) -> Self {
        Self { next, extensions }
    }
}

impl<'a> Upstream<InterceptedRequest> for ReqwestUpstream<'a> {
    type Response = Result<reqwest::Response, Error>;
    type Future = Pin<Box<dyn Future<Output = Self::Response> + Send + 'a>>;

    fn call(&mut self, req: InterceptedRequest) -> Self::Future {
        let next = self.next.clone();
        let mut extensions = std::mem::take(&mut self.extensions);

        Box::pin(async move {
            next.run(req.into_inner(), &mut extensions)
                .await
                .map_err(from_middleware_error)
        })
    }
}

/// Upstream that buffers the response so the cache middleware can store it.
pub struct CapturingUpstream<'a> {
    inner: ReqwestUpstream<'a>,
}

impl<'a> CapturingUpstream<'a> {
    /// Create a new upstream wrapper.
    pub fn new(next: Next<'a>, extensions: Extensions) -> Self {
        Self {
            inner: ReqwestUpstream::new(next, extensions),
        }
    }
}

impl<'a> Upstream<InterceptedRequest> for CapturingUpstream<'a> {
    type Response = Result<CapturedResponse, Error>;
    type Future = Pin<Box<dyn Future<Output = Self::Response> + Send + 'a>>;

    fn call(&mut self, req: InterceptedRequest) -> Self::Future {
        let response = self.inner.call(req);

        Box::pin(async move {
            let response = response.await?;
            CapturedResponse::capture(response)
                .await
                .map_err(|error| Error::transport(reqwest_middleware::Error::Reqwest(error)))
        })
    }
}
