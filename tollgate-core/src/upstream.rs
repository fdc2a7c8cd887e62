use std::future::Future;

/// Trait for calling the wrapped transport with an outgoing request.
///
/// Every middleware layer in `tollgate` both consumes and implements this
/// trait, so layers can be stacked in any order in front of the real transport.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate_core::{Error, Upstream};
/// use std::future::Ready;
///
/// struct MockUpstream {
///     response: MyResponse,
/// }
///
/// impl Upstream<MyRequest> for MockUpstream {
///     type Response = Result<MyResponse, Error>;
///     type Future = Ready<Self::Response>;
///
///     fn call(&mut self, _req: MyRequest) -> Self::Future {
///         std::future::ready(Ok(self.response.clone()))
///     }
/// }
/// ```
pub trait Upstream<Req> {
    /// The response type returned by the transport
    type Response;

    /// The future that resolves to the response
    type Future: Future<Output = Self::Response> + Send;

    /// Call the transport with the given request.
    ///
    /// Layers do all of their registry bookkeeping synchronously inside `call`,
    /// before the returned future is first polled.
    fn call(&mut self, req: Req) -> Self::Future;
}
