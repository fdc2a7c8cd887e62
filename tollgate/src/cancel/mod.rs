//! Request cancellation layer.
//!
//! A `cancelable` request aborts any pending request with the same canonical
//! URL before it is dispatched. A `cancel_on_navigation_only` request is keyed
//! uniquely and is only reached by [`Cancel::cancel_all`], typically forwarded
//! from a navigation signal (see [`crate::navigation`]).
//!
//! A cancelled request resolves to [`Error::Cancelled`](tollgate_core::Error::Cancelled).

mod layer;
mod service;

pub use layer::{Cancel, CancelBuilder};
pub use service::{CancelFuture, CancelGuard, CancelService};
