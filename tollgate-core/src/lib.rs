#![warn(missing_docs)]
//! # tollgate-core
//!
//! Core traits and types for the tollgate request interception layer.
//!
//! This crate is **transport-agnostic**. It defines the abstractions that the
//! middleware layers in `tollgate` are written against, and that transport
//! integrations (like `tollgate-reqwest`) implement:
//!
//! - **Call** the wrapped transport ([`Upstream`])
//! - **Describe** an outgoing request ([`Interceptable`], [`RequestFlags`])
//! - **Identify** requests by canonical URL ([`Canonicalize`], [`IdentityKey`])
//! - **Compare** request parameters ([`ParamsMatcher`], [`match_params`])
//! - **Report** interception outcomes ([`Error`])

pub mod canonicalize;
pub mod error;
pub mod key;
pub mod matcher;
pub mod params;
pub mod request;
pub mod upstream;

pub use canonicalize::{Canonicalize, UrlCanonicalizer};
pub use error::{Error, TransportError, is_cancellation, is_duplicate_submission};
pub use key::IdentityKey;
pub use matcher::{DeepEqual, ParamsMatcher};
pub use params::{match_params, query_params};
pub use request::{Interceptable, RequestFlags};
pub use upstream::Upstream;
