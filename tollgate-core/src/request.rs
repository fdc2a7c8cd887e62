//! Outgoing request description.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-request interception flags.
///
/// Every flag defaults to `false`, so a request without flags passes through
/// all layers untouched.
///
/// ```
/// use tollgate_core::RequestFlags;
///
/// let flags = RequestFlags::new().cacheable().force_refresh();
/// assert!(flags.cacheable && flags.force_refresh);
/// assert!(!flags.lockable);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFlags {
    /// Opt into the cache layer.
    pub cacheable: bool,
    /// Bypass a cache hit and always re-fetch.
    pub force_refresh: bool,
    /// Cancel a pending request with the same identity.
    pub cancelable: bool,
    /// Only cancel on a bulk (navigation) cancellation.
    pub cancel_on_navigation_only: bool,
    /// Allow a single in-flight request per identity.
    pub lockable: bool,
    /// Keep the lock engaged after settlement until it is released explicitly.
    pub deferred_release: bool,
    /// Veto: another layer has exclusive control, skip caching and cancellation.
    pub locked: bool,
}

impl RequestFlags {
    /// Flags with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`cacheable`](Self::cacheable).
    pub fn cacheable(self) -> Self {
        Self {
            cacheable: true,
            ..self
        }
    }

    /// Sets [`force_refresh`](Self::force_refresh).
    pub fn force_refresh(self) -> Self {
        Self {
            force_refresh: true,
            ..self
        }
    }

    /// Sets [`cancelable`](Self::cancelable).
    pub fn cancelable(self) -> Self {
        Self {
            cancelable: true,
            ..self
        }
    }

    /// Sets [`cancel_on_navigation_only`](Self::cancel_on_navigation_only).
    pub fn cancel_on_navigation_only(self) -> Self {
        Self {
            cancel_on_navigation_only: true,
            ..self
        }
    }

    /// Sets [`lockable`](Self::lockable).
    pub fn lockable(self) -> Self {
        Self {
            lockable: true,
            ..self
        }
    }

    /// Sets [`deferred_release`](Self::deferred_release).
    pub fn deferred_release(self) -> Self {
        Self {
            deferred_release: true,
            ..self
        }
    }

    /// Sets [`locked`](Self::locked).
    pub fn locked(self) -> Self {
        Self {
            locked: true,
            ..self
        }
    }

    /// Returns `true` if any cancellation mode is requested.
    pub fn wants_cancellation(&self) -> bool {
        self.cancelable || self.cancel_on_navigation_only
    }
}

/// A request the interception layers can inspect.
///
/// Transport integrations implement this for their request type. Only
/// [`url`](Interceptable::url), [`method`](Interceptable::method) and
/// [`flags`](Interceptable::flags) are required; the parameter accessors are
/// used by the cache layer to decide whether a stored entry matches.
pub trait Interceptable {
    /// The request URL, absolute or relative.
    fn url(&self) -> &str;

    /// The HTTP method.
    fn method(&self) -> &Method;

    /// Interception flags for this request.
    fn flags(&self) -> RequestFlags;

    /// Explicit query parameters supplied next to the URL.
    fn params(&self) -> Option<Value> {
        None
    }

    /// The request payload for write-style methods.
    fn body(&self) -> Option<Value> {
        None
    }
}

impl<T> Interceptable for &T
where
    T: Interceptable + ?Sized,
{
    fn url(&self) -> &str {
        (**self).url()
    }

    fn method(&self) -> &Method {
        (**self).method()
    }

    fn flags(&self) -> RequestFlags {
        (**self).flags()
    }

    fn params(&self) -> Option<Value> {
        (**self).params()
    }

    fn body(&self) -> Option<Value> {
        (**self).body()
    }
}
