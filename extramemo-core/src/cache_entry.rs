use std::time::Duration;
use tokio::time::Instant;

/// A cached value together with the moment it was stored.
///
/// Stores use the entry age to decide freshness: a plain TTL store expires an
/// entry once its age reaches the TTL, a stale-if-error store keeps it around
/// for an extra window as a fallback.
///
/// # Examples
///
/// ```
/// use extramemo_core::CacheEntry;
/// use std::time::Duration;
///
/// let entry = CacheEntry::new(42);
/// assert_eq!(entry.value, 42);
/// assert!(!entry.is_expired(Some(Duration::from_secs(60))));
/// assert!(!entry.is_expired(None));
/// ```
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Creates a new cache entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Returns true if the entry age has reached `ttl`. `None` never expires.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.age() >= ttl,
            None => false,
        }
    }
}
