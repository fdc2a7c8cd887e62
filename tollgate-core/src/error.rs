//! Error taxonomy shared by every layer.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::IdentityKey;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by the transport, as carried by [`Error::Transport`].
#[derive(Debug)]
pub struct TransportError(BoxError);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Error produced by an intercepted request.
///
/// Layers only ever create [`DuplicateSubmission`](Error::DuplicateSubmission)
/// and [`Cancelled`](Error::Cancelled). Transport failures travel through every
/// layer untouched as [`Transport`](Error::Transport).
///
/// The type is `Clone` because a cached response future is shared between
/// every caller that hits the same entry.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An identical lockable request is already in flight.
    ///
    /// The transport was never called for the rejected request.
    #[error("duplicate submission: {0} is already in flight")]
    DuplicateSubmission(IdentityKey),

    /// The request was cancelled before it settled, either by a newer request
    /// with the same identity or by a bulk cancellation.
    #[error("request to {0} was cancelled")]
    Cancelled(IdentityKey),

    /// Failure reported by the transport (network, decode, status).
    ///
    /// The failure is only shared when the error is cloned, so an unshared
    /// error can hand it back by value with [`into_transport`](Error::into_transport).
    #[error(transparent)]
    Transport(Arc<TransportError>),
}

impl Error {
    /// Wraps a transport failure.
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Arc::new(TransportError(Box::new(error))))
    }

    /// Returns `true` if the request was cancelled.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns `true` if the request was rejected as a duplicate submission.
    pub fn is_duplicate_submission(&self) -> bool {
        matches!(self, Self::DuplicateSubmission(_))
    }

    /// Returns the identity key of a rejected or cancelled request.
    pub fn key(&self) -> Option<&IdentityKey> {
        match self {
            Self::DuplicateSubmission(key) | Self::Cancelled(key) => Some(key),
            Self::Transport(_) => None,
        }
    }

    /// Returns the transport failure if it is of type `T`.
    pub fn downcast_transport<T>(&self) -> Option<&T>
    where
        T: std::error::Error + 'static,
    {
        match self {
            Self::Transport(source) => source.0.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Takes back the transport failure if it is of type `T`.
    ///
    /// Returns `self` unchanged when the error is not a transport failure of
    /// type `T`, or when a clone of it is still alive.
    pub fn into_transport<T>(self) -> Result<T, Self>
    where
        T: std::error::Error + 'static,
    {
        match self {
            Self::Transport(source) => match Arc::try_unwrap(source) {
                Ok(TransportError(source)) => source
                    .downcast::<T>()
                    .map(|source| *source)
                    .map_err(|source| Self::Transport(Arc::new(TransportError(source)))),
                Err(shared) => Err(Self::Transport(shared)),
            },
            other => Err(other),
        }
    }
}

/// Returns `true` if `error` is a cancellation outcome rather than any other failure.
pub fn is_cancellation(error: &Error) -> bool {
    error.is_cancellation()
}

/// Returns `true` if `error` is a rejected duplicate submission.
pub fn is_duplicate_submission(error: &Error) -> bool {
    error.is_duplicate_submission()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("connection reset")]
    struct ConnectionReset;

    #[test]
    fn test_classification() {
        let cancelled = Error::Cancelled(IdentityKey::new("/api/user"));
        assert!(is_cancellation(&cancelled));
        assert!(!is_duplicate_submission(&cancelled));

        let duplicate = Error::DuplicateSubmission(IdentityKey::new("/api/submit"));
        assert!(duplicate.is_duplicate_submission());
        assert_eq!(duplicate.key().unwrap(), "/api/submit");

        let transport = Error::transport(ConnectionReset);
        assert!(!transport.is_cancellation());
        assert!(transport.key().is_none());
    }

    #[test]
    fn test_transport_passes_through() {
        let error = Error::transport(ConnectionReset);
        assert_eq!(error.to_string(), "connection reset");
        assert!(error.downcast_transport::<ConnectionReset>().is_some());

        let cloned = error.clone();
        assert!(cloned.downcast_transport::<ConnectionReset>().is_some());
    }

    #[test]
    fn test_into_transport_returns_original() {
        let error = Error::transport(ConnectionReset);
        assert!(matches!(error.into_transport::<ConnectionReset>(), Ok(ConnectionReset)));

        let other = Error::transport(std::io::Error::other("refused"));
        let other = other.into_transport::<ConnectionReset>().unwrap_err();
        assert!(other.downcast_transport::<std::io::Error>().is_some());

        let shared = Error::transport(ConnectionReset);
        let clone = shared.clone();
        assert!(shared.into_transport::<ConnectionReset>().is_err());
        assert!(matches!(clone.into_transport::<ConnectionReset>(), Ok(ConnectionReset)));

        let cancelled = Error::Cancelled(IdentityKey::new("/api/feed"));
        assert!(cancelled.into_transport::<ConnectionReset>().unwrap_err().is_cancellation());
    }
}
