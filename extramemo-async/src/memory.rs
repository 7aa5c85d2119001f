//! In-memory cache backends.
//!
//! [`MemoryAsyncCache`] implements [`AsyncCache`] and [`MemoryStaleIfErrorCache`]
//! implements [`StaleIfErrorCache`]. Both are backed by a [`DashMap`] of
//! [`CacheEntry`] values and expire entries lazily, on read.

use async_trait::async_trait;
use dashmap::DashMap;
use extramemo_core::{AsyncCache, CacheEntry, CacheError, CacheRead, StaleIfErrorCache, StaleRead};
use std::time::Duration;

/// An [`AsyncCache`] kept in process memory, with an optional TTL.
///
/// # Examples
///
/// ```
/// use extramemo_async::MemoryAsyncCache;
/// use extramemo_core::{AsyncCache, CacheRead};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = MemoryAsyncCache::with_ttl(Duration::from_secs(30));
/// cache.set("answer", 42).await.unwrap();
/// assert_eq!(cache.get("answer").await.unwrap(), CacheRead::Hit(42));
/// # }
/// ```
pub struct MemoryAsyncCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Option<Duration>,
}

impl<V> MemoryAsyncCache<V> {
    /// Creates a cache whose entries never expire.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
        }
    }

    /// Creates a cache whose entries expire once they are `ttl` old.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for MemoryAsyncCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> AsyncCache<V> for MemoryAsyncCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<CacheRead<V>, CacheError> {
        let ttl = self.ttl;
        // Drop the map guard before touching the map again.
        let read = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(ttl)).then(|| entry.value.clone()));

        match read {
            Some(Some(value)) => Ok(CacheRead::Hit(value)),
            Some(None) => {
                self.entries
                    .remove_if(key, |_, entry| entry.is_expired(ttl));
                Ok(CacheRead::Miss)
            }
            None => Ok(CacheRead::Miss),
        }
    }

    async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), CacheEntry::new(value));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}

/// A [`StaleIfErrorCache`] kept in process memory.
///
/// An entry is fresh (`Hit`) while younger than `time_to_live`. For a further
/// `stale_if_error` it is reported as `StaleIfError`, so a memoizer can fall
/// back to it when a refresh fails. After that it is a `Miss` and is removed.
///
/// # Examples
///
/// ```
/// use extramemo_async::MemoryStaleIfErrorCache;
/// use extramemo_core::{StaleIfErrorCache, StaleRead};
/// use std::time::Duration;
///
/// let cache = MemoryStaleIfErrorCache::new(Duration::from_secs(60))
///     .stale_if_error(Duration::from_secs(600));
/// cache.set("config", "v1").unwrap();
/// assert_eq!(cache.get("config").unwrap(), StaleRead::Hit("v1"));
/// assert_eq!(cache.get("other").unwrap(), StaleRead::Miss);
/// ```
pub struct MemoryStaleIfErrorCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    time_to_live: Duration,
    stale_if_error: Duration,
}

impl<V> MemoryStaleIfErrorCache<V> {
    /// Creates a cache with the given freshness window and no stale window.
    pub fn new(time_to_live: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            time_to_live,
            stale_if_error: Duration::ZERO,
        }
    }

    /// Keeps expired entries as fallbacks for `window` past their freshness.
    pub fn stale_if_error(mut self, window: Duration) -> Self {
        self.stale_if_error = window;
        self
    }

    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    pub fn stale_window(&self) -> Duration {
        self.stale_if_error
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn retention(&self) -> Duration {
        self.time_to_live.saturating_add(self.stale_if_error)
    }
}

impl<V> StaleIfErrorCache<V> for MemoryStaleIfErrorCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<StaleRead<V>, CacheError> {
        let retention = self.retention();
        let read = self.entries.get(key).map(|entry| {
            let age = entry.age();
            if age < self.time_to_live {
                StaleRead::Hit(entry.value.clone())
            } else if age < retention {
                StaleRead::StaleIfError(entry.value.clone())
            } else {
                StaleRead::Miss
            }
        });

        match read {
            Some(StaleRead::Miss) => {
                self.entries
                    .remove_if(key, |_, entry| entry.is_expired(Some(retention)));
                Ok(StaleRead::Miss)
            }
            Some(read) => Ok(read),
            None => Ok(StaleRead::Miss),
        }
    }

    fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), CacheEntry::new(value));
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}
