#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Response caching.
///
/// Provides the [`Cache`](cache::Cache) layer which replays a stored response
/// for a repeated cacheable request with the same parameters until the entry
/// expires.
pub mod cache;

/// Cancellation of superseded or navigation-scoped requests.
///
/// Provides the [`Cancel`](cancel::Cancel) layer and bulk cancellation via
/// [`Cancel::cancel_all`](cancel::Cancel::cancel_all).
pub mod cancel;

/// Cache layer configuration.
pub mod config;

/// Single in-flight submission per URL.
///
/// Provides the [`Lock`](lock::Lock) layer and explicit release via
/// [`Lock::release_lock`](lock::Lock::release_lock).
pub mod lock;

/// Metrics collection for interception outcomes.
///
/// When the `metrics` feature is enabled, this module provides counters for:
/// - Cache hits, misses, stores and evictions
/// - Cancelled requests
/// - Rejected duplicate submissions
pub mod metrics;

pub mod navigation;

/// Response qualification for caching.
pub mod predicate;

/// Registries of cache entries, cancellation handles and submission locks.
pub mod registry;

pub use cache::Cache;
pub use cancel::Cancel;
pub use config::CacheOptions;
pub use lock::Lock;
pub use predicate::{Always, Never, ShouldCache};

pub use tollgate_core::{
    Canonicalize, DeepEqual, Error, IdentityKey, Interceptable, ParamsMatcher, RequestFlags,
    UrlCanonicalizer, Upstream, is_cancellation, is_duplicate_submission,
};
