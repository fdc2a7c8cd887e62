#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod error;
mod middleware;
mod predicate;
mod request;
mod response;
mod upstream;

pub use error::{is_cancellation, is_duplicate_submission, tollgate_error, transport_error};
pub use middleware::{CacheMiddleware, CancelMiddleware, LockMiddleware};
pub use predicate::{JsonPredicate, SuccessStatus};
pub use request::InterceptedRequest;
pub use response::CapturedResponse;
pub use upstream::{CapturingUpstream, ReqwestUpstream};

// Re-export common types
pub use tollgate::cache::Cache;
pub use tollgate::cancel::Cancel;
pub use tollgate::config::CacheOptions;
pub use tollgate::lock::Lock;
pub use tollgate_core::{RequestFlags, UrlCanonicalizer};
