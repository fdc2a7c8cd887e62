//! Metrics declaration and recording helpers.
//!
//! When the `metrics` feature is disabled every helper is an empty inline
//! function and is eliminated by the compiler.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Cache layer metrics

    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "tollgate_cache_hit_total",
            "Total number of cache hit events."
        );
        "tollgate_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "tollgate_cache_miss_total",
            "Total number of cache miss events."
        );
        "tollgate_cache_miss_total"
    };
    /// Track number of responses stored in the cache.
    pub static ref CACHE_STORE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "tollgate_cache_store_total",
            "Total number of responses stored in the cache."
        );
        "tollgate_cache_store_total"
    };
    /// Track number of entries evicted because the cache was full.
    pub static ref CACHE_EVICTION_COUNTER: &'static str = {
        metrics::describe_counter!(
            "tollgate_cache_eviction_total",
            "Total number of entries evicted because the cache was full."
        );
        "tollgate_cache_eviction_total"
    };

    // Cancellation layer metrics

    /// Track number of cancelled requests.
    pub static ref REQUESTS_CANCELLED: &'static str = {
        metrics::describe_counter!(
            "tollgate_requests_cancelled_total",
            "Total number of in-flight requests cancelled."
        );
        "tollgate_requests_cancelled_total"
    };

    // Submission-lock layer metrics

    /// Track number of rejected duplicate submissions.
    pub static ref DUPLICATE_SUBMISSIONS: &'static str = {
        metrics::describe_counter!(
            "tollgate_duplicate_submissions_total",
            "Total number of requests rejected as duplicate submissions."
        );
        "tollgate_duplicate_submissions_total"
    };
}

/// Record a cache lookup outcome.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_lookup(hit: bool) {
    let counter = if hit {
        *CACHE_HIT_COUNTER
    } else {
        *CACHE_MISS_COUNTER
    };
    metrics::counter!(counter).increment(1);
}

/// Record a stored response and whether it evicted another entry.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_store(evicted: bool) {
    metrics::counter!(*CACHE_STORE_COUNTER).increment(1);
    if evicted {
        metrics::counter!(*CACHE_EVICTION_COUNTER).increment(1);
    }
}

/// Record cancelled requests.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cancelled(count: usize) {
    metrics::counter!(*REQUESTS_CANCELLED).increment(count as u64);
}

/// Record a rejected duplicate submission.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_duplicate_submission() {
    metrics::counter!(*DUPLICATE_SUBMISSIONS).increment(1);
}

/// No-op version when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_lookup(_hit: bool) {}

/// No-op version when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_store(_evicted: bool) {}

/// No-op version when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cancelled(_count: usize) {}

/// No-op version when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_duplicate_submission() {}
