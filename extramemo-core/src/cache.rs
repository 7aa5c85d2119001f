//! # Cache Ports
//!
//! The narrow contracts a memoizer needs from a cache backend.
//!
//! Memoizers never evict or delete entries themselves: they read on every call
//! and write when a computation qualifies for caching. Everything else
//! (eviction, expiry, persistence) belongs to the implementation.
//!
//! - [`Cache`] - synchronous, infallible store used by [`Memoize`](crate::Memoize)
//! - [`AsyncCache`] - async store reporting `Hit`/`Miss`
//! - [`StaleIfErrorCache`] - synchronous store that can also report an expired
//!   entry as a stale-if-error fallback
//!
//! Every port is implemented for `Arc<C>`, so one store can back several
//! memoized functions. Use the memoizer `name` to keep their keys apart.

use crate::{CacheError, CacheRead, StaleRead};
use async_trait::async_trait;
use std::sync::Arc;

/// Synchronous key-value store.
pub trait Cache<V> {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V);
    fn clear(&self);
}

/// Asynchronous key-value store reporting freshness on read.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use extramemo_core::{AsyncCache, CacheError, CacheRead};
/// use parking_lot::Mutex;
/// use std::collections::HashMap;
///
/// #[derive(Default)]
/// struct MapCache(Mutex<HashMap<String, u64>>);
///
/// #[async_trait]
/// impl AsyncCache<u64> for MapCache {
///     async fn get(&self, key: &str) -> Result<CacheRead<u64>, CacheError> {
///         Ok(self.0.lock().get(key).copied().into())
///     }
///
///     async fn set(&self, key: &str, value: u64) -> Result<(), CacheError> {
///         self.0.lock().insert(key.to_string(), value);
///         Ok(())
///     }
///
///     async fn clear(&self) -> Result<(), CacheError> {
///         self.0.lock().clear();
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncCache<V: Send + 'static>: Send + Sync {
    async fn get(&self, key: &str) -> Result<CacheRead<V>, CacheError>;
    async fn set(&self, key: &str, value: V) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Synchronous store that distinguishes fresh entries from stale fallbacks.
///
/// `get` must never suspend. An entry past its freshness window but still
/// inside its stale-if-error window is reported as [`StaleRead::StaleIfError`].
pub trait StaleIfErrorCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Result<StaleRead<V>, CacheError>;
    fn set(&self, key: &str, value: V) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

impl<V, C> Cache<V> for Arc<C>
where
    C: Cache<V> + ?Sized,
{
    fn get(&self, key: &str) -> Option<V> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V) {
        (**self).set(key, value)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[async_trait]
impl<V, C> AsyncCache<V> for Arc<C>
where
    V: Send + 'static,
    C: AsyncCache<V> + ?Sized,
{
    async fn get(&self, key: &str) -> Result<CacheRead<V>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        (**self).set(key, value).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        (**self).clear().await
    }
}

impl<V, C> StaleIfErrorCache<V> for Arc<C>
where
    C: StaleIfErrorCache<V> + ?Sized,
{
    fn get(&self, key: &str) -> Result<StaleRead<V>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }
}
