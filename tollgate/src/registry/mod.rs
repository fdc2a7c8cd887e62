//! Identity-keyed registries backing the three layers.
//!
//! Each layer owns its registry through an `Arc<dyn ...Store>`. Layers built
//! from the same handle share state; separately built layers (for example in
//! tests) are fully isolated.

pub mod cache;
pub mod cancel;
pub mod lock;

pub use cache::{CacheEntry, CachePool, CacheStore, SharedResponse, share};
pub use cancel::{CancelHandle, CancelKey, CancelRegistry, CancelStore};
pub use lock::{LockRegistry, LockStore};
