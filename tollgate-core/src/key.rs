//! Request identity keys.
//!
//! An [`IdentityKey`] is the canonical form of a request URL (origin and path,
//! no query or fragment). All three registries are keyed by it.
//!
//! ```
//! use tollgate_core::IdentityKey;
//!
//! let key = IdentityKey::new("https://example.com/api/user");
//! assert_eq!(key.as_str(), "https://example.com/api/user");
//! assert_eq!(format!("{}", key), "https://example.com/api/user");
//! ```
//!
//! [`IdentityKey`] uses [`SmolStr`] internally, so short keys are stored
//! inline and cloning a long key only bumps a reference count.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Canonical identity of an outgoing request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(SmolStr);

impl IdentityKey {
    /// Creates a key from an already canonical string.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(SmolStr::new(key))
    }

    /// Creates a key from a static string without allocating.
    pub const fn new_static(key: &'static str) -> Self {
        Self(SmolStr::new_static(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for IdentityKey {
    fn from(key: String) -> Self {
        Self(SmolStr::from(key))
    }
}

impl PartialEq<str> for IdentityKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for IdentityKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
