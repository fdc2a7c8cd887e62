//! Cache layer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lifetime of a cache entry (2 minutes).
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default maximum number of cache entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Options applied when the cache layer is constructed.
///
/// ```
/// use std::time::Duration;
/// use tollgate::config::CacheOptions;
///
/// let options = CacheOptions::default();
/// assert_eq!(options.timeout, Duration::from_secs(120));
/// assert_eq!(options.max_entries, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CacheOptions {
    /// Time an entry stays valid after insertion (e.g., "500ms", "2m").
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Maximum number of entries; the oldest entry is evicted on overflow.
    /// Zero disables storing.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_timeout() -> Duration {
    DEFAULT_CACHE_TIMEOUT
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CACHE_TIMEOUT,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheOptions {
    /// Sets the entry timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(self, max_entries: usize) -> Self {
        Self {
            max_entries,
            ..self
        }
    }
}
