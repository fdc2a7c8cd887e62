//! Bounded FIFO store of shared responses.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tokio::time::Instant;
use tollgate_core::{Error, IdentityKey};

use crate::config::DEFAULT_MAX_ENTRIES;

/// Multi-subscriber future of a transport result.
///
/// Every caller that hits the same entry awaits a clone of this future and
/// observes the same outcome.
pub type SharedResponse<Res> = Shared<BoxFuture<'static, Result<Res, Error>>>;

/// Wraps an already produced response into a [`SharedResponse`].
pub fn share<Res>(response: Res) -> SharedResponse<Res>
where
    Res: Clone + Send + 'static,
{
    futures::future::ready(Ok(response)).boxed().shared()
}

/// A stored response together with the data needed to decide a hit.
#[derive(Clone)]
pub struct CacheEntry<Res>
where
    Res: Clone,
{
    key: IdentityKey,
    expire_at: Instant,
    params: Value,
    response: SharedResponse<Res>,
}

impl<Res> CacheEntry<Res>
where
    Res: Clone,
{
    /// Creates an entry.
    pub fn new(
        key: IdentityKey,
        expire_at: Instant,
        params: Value,
        response: SharedResponse<Res>,
    ) -> Self {
        Self {
            key,
            expire_at,
            params,
            response,
        }
    }

    /// Identity key of the entry.
    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// Instant from which the entry is no longer served.
    pub fn expire_at(&self) -> Instant {
        self.expire_at
    }

    /// Parameters of the request that produced the entry.
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// The shared response future.
    pub fn response(&self) -> &SharedResponse<Res> {
        &self.response
    }

    /// Returns `true` once `now` reaches the expiration instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expire_at
    }
}

impl<Res> std::fmt::Debug for CacheEntry<Res>
where
    Res: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("expire_at", &self.expire_at)
            .field("params", &self.params)
            .field("response", &"...")
            .finish()
    }
}

/// Storage used by the cache layer.
///
/// Implementations must keep at most one entry per key and must make each
/// method a single critical section.
pub trait CacheStore<Res>: Send + Sync
where
    Res: Clone,
{
    /// Returns the entry stored under `key`, expired or not.
    fn get(&self, key: &IdentityKey) -> Option<CacheEntry<Res>>;

    /// Stores `entry`, replacing any entry with the same key.
    ///
    /// Returns the entry evicted to respect the capacity, if any. A store with
    /// no capacity keeps nothing and returns `None`.
    fn insert(&self, entry: CacheEntry<Res>) -> Option<CacheEntry<Res>>;

    /// Removes the entry stored under `key`.
    fn remove(&self, key: &IdentityKey) -> Option<CacheEntry<Res>>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`CacheStore`] evicting in insertion order.
///
/// Reads never promote an entry, so the oldest inserted entry is always the
/// next one evicted.
pub struct CachePool<Res>
where
    Res: Clone,
{
    entries: Mutex<VecDeque<CacheEntry<Res>>>,
    max_entries: usize,
}

impl<Res> CachePool<Res>
where
    Res: Clone,
{
    /// Creates an empty pool holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries,
        }
    }

    /// Maximum number of entries.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Keys in insertion order, oldest first.
    pub fn keys(&self) -> Vec<IdentityKey> {
        self.lock().iter().map(|entry| entry.key.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<CacheEntry<Res>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<Res> Default for CachePool<Res>
where
    Res: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl<Res> CacheStore<Res> for CachePool<Res>
where
    Res: Clone + Send + Sync,
{
    fn get(&self, key: &IdentityKey) -> Option<CacheEntry<Res>> {
        self.lock().iter().find(|entry| &entry.key == key).cloned()
    }

    fn insert(&self, entry: CacheEntry<Res>) -> Option<CacheEntry<Res>> {
        if self.max_entries == 0 {
            return None;
        }
        let mut entries = self.lock();
        entries.retain(|stored| stored.key != entry.key);
        let evicted = if entries.len() >= self.max_entries {
            entries.pop_front()
        } else {
            None
        };
        entries.push_back(entry);
        evicted
    }

    fn remove(&self, key: &IdentityKey) -> Option<CacheEntry<Res>> {
        let mut entries = self.lock();
        let position = entries.iter().position(|entry| &entry.key == key)?;
        entries.remove(position)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn entry(key: &str, value: &'static str) -> CacheEntry<&'static str> {
        CacheEntry::new(
            IdentityKey::new(key),
            Instant::now() + Duration::from_secs(60),
            json!({}),
            share(value),
        )
    }

    #[tokio::test]
    async fn test_insert_replaces_same_key() {
        let pool = CachePool::new(3);
        pool.insert(entry("/a", "first"));
        pool.insert(entry("/b", "b"));
        pool.insert(entry("/a", "second"));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.keys(), vec![IdentityKey::new("/b"), IdentityKey::new("/a")]);
        let stored = pool.get(&IdentityKey::new("/a")).unwrap();
        assert_eq!(stored.response().clone().await.unwrap(), "second");
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let pool = CachePool::new(2);
        assert!(pool.insert(entry("/a", "a")).is_none());
        assert!(pool.insert(entry("/b", "b")).is_none());

        // Reads do not promote.
        assert!(pool.get(&IdentityKey::new("/a")).is_some());

        let evicted = pool.insert(entry("/c", "c")).unwrap();
        assert_eq!(evicted.key(), &IdentityKey::new("/a"));
        assert_eq!(pool.keys(), vec![IdentityKey::new("/b"), IdentityKey::new("/c")]);
    }

    #[test]
    fn test_replacing_at_capacity_does_not_evict() {
        let pool = CachePool::new(2);
        pool.insert(entry("/a", "a"));
        pool.insert(entry("/b", "b"));
        assert!(pool.insert(entry("/a", "a2")).is_none());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let pool = CachePool::new(0);
        assert!(pool.insert(entry("/a", "a")).is_none());
        assert!(pool.insert(entry("/b", "b")).is_none());
        assert!(pool.is_empty());
        assert!(pool.get(&IdentityKey::new("/a")).is_none());
    }

    #[test]
    fn test_remove() {
        let pool = CachePool::default();
        pool.insert(entry("/a", "a"));
        assert!(pool.remove(&IdentityKey::new("/a")).is_some());
        assert!(pool.remove(&IdentityKey::new("/a")).is_none());
        assert!(pool.is_empty());
    }
}
