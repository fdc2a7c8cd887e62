//! Response cache layer.
//!
//! A cacheable request whose canonical URL has an unexpired entry with
//! matching parameters is answered from the stored shared response without
//! calling the transport. Otherwise the transport is called and a successful
//! response accepted by the [`ShouldCache`](crate::predicate::ShouldCache)
//! predicate is stored, replacing any previous entry for the same URL.
//!
//! Concurrent misses for the same URL are not coalesced: each one calls the
//! transport and the last qualifying response wins the entry.

mod layer;
mod service;

pub use layer::{Cache, CacheBuilder};
pub use service::{CacheFuture, CacheService, PendingEntry};
