//! Response qualification for the cache layer.

/// Decides whether a successful response may be stored.
///
/// The predicate sees the response after the transport produced it. Any
/// decoding of the body happens inside the predicate; the cache always stores
/// the raw response.
pub trait ShouldCache<Res>: Send + Sync {
    /// Returns `true` if `response` should be stored.
    fn should_cache(&self, response: &Res) -> bool;
}

/// Predicate that never caches. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl<Res> ShouldCache<Res> for Never {
    fn should_cache(&self, _response: &Res) -> bool {
        false
    }
}

/// Predicate that caches every successful response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl<Res> ShouldCache<Res> for Always {
    fn should_cache(&self, _response: &Res) -> bool {
        true
    }
}

impl<Res, F> ShouldCache<Res> for F
where
    F: Fn(&Res) -> bool + Send + Sync,
{
    fn should_cache(&self, response: &Res) -> bool {
        self(response)
    }
}
