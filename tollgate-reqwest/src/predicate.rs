//! Cache predicates over captured responses.

use serde_json::Value;
use tollgate::ShouldCache;

use crate::response::CapturedResponse;

/// Caches responses whose decoded JSON body satisfies a closure.
///
/// A body that is not valid JSON is never cached.
///
/// ```
/// use tollgate_reqwest::JsonPredicate;
///
/// // Cache only payloads reporting success.
/// let predicate = JsonPredicate::new(|body| body["code"] == 0);
/// # let _ = predicate;
/// ```
#[derive(Debug, Clone)]
pub struct JsonPredicate<F> {
    check: F,
}

impl<F> JsonPredicate<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    /// Creates a predicate from `check`.
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> ShouldCache<CapturedResponse> for JsonPredicate<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn should_cache(&self, response: &CapturedResponse) -> bool {
        response
            .json::<Value>()
            .is_ok_and(|body| (self.check)(&body))
    }
}

/// Caches every response with a 2xx status.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessStatus;

impl ShouldCache<CapturedResponse> for SuccessStatus {
    fn should_cache(&self, response: &CapturedResponse) -> bool {
        response.status().is_success()
    }
}
