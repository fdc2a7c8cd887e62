//! Submission-lock layer.
//!
//! At most one `lockable` request per canonical URL reaches the transport at a
//! time. A second request arriving while the first is in flight resolves to
//! [`Error::DuplicateSubmission`](tollgate_core::Error::DuplicateSubmission)
//! without calling the transport.
//!
//! The mark is cleared when the request settles, whether it succeeded or
//! failed. Requests flagged `deferred_release` keep the mark until
//! [`Lock::release_lock`] is called, for flows that span several steps.

mod layer;
mod service;

pub use layer::{Lock, LockBuilder};
pub use service::{LockFuture, LockGuard, LockService};
