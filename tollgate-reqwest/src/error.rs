//! Conversion between tollgate errors and reqwest-middleware errors.
//!
//! A cancelled or rejected request reaches the caller as
//! [`reqwest_middleware::Error::Middleware`] wrapping a [`tollgate_core::Error`].
//! Use [`is_cancellation`] and [`is_duplicate_submission`] to classify it.
//! Failures of the inner client are handed back unchanged.

use tollgate_core::Error;

/// Returns the tollgate error carried by `error`, if any.
pub fn tollgate_error(error: &reqwest_middleware::Error) -> Option<&Error> {
    match error {
        reqwest_middleware::Error::Middleware(source) => source.downcast_ref::<Error>(),
        _ => None,
    }
}

/// Returns `true` if the request was cancelled by the cancellation middleware.
pub fn is_cancellation(error: &reqwest_middleware::Error) -> bool {
    tollgate_error(error).is_some_and(Error::is_cancellation)
}

/// Returns `true` if the request was rejected by the submission-lock middleware.
pub fn is_duplicate_submission(error: &reqwest_middleware::Error) -> bool {
    tollgate_error(error).is_some_and(Error::is_duplicate_submission)
}

/// Returns the failure reported by the inner client, if `error` is one.
pub fn transport_error(error: &reqwest_middleware::Error) -> Option<&reqwest_middleware::Error> {
    match tollgate_error(error) {
        Some(tollgate) => tollgate.downcast_transport::<reqwest_middleware::Error>(),
        None => Some(error),
    }
}

/// Converts an error returned by the rest of the middleware chain.
///
/// A tollgate error raised by a nested tollgate middleware is passed on as is,
/// so stacked middlewares keep their classification.
pub(crate) fn from_middleware_error(error: reqwest_middleware::Error) -> Error {
    match error {
        reqwest_middleware::Error::Middleware(source) => match source.downcast::<Error>() {
            Ok(error) => error,
            Err(source) => Error::transport(reqwest_middleware::Error::Middleware(source)),
        },
        error => Error::transport(error),
    }
}

/// Converts a tollgate error for the caller.
///
/// A transport failure is unwrapped back to the error the inner client raised.
pub(crate) fn into_middleware_error(error: Error) -> reqwest_middleware::Error {
    match error.into_transport::<reqwest_middleware::Error>() {
        Ok(original) => original,
        Err(error) => reqwest_middleware::Error::middleware(error),
    }
}
