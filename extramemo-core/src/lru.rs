use crate::Cache;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// A bounded, thread-safe cache evicting the least recently used entry.
///
/// Reads move a key to the most recent position; inserting past the limit
/// evicts from the front of the order queue. A limit of zero is treated as one.
///
/// # Examples
///
/// ```
/// use extramemo_core::{Cache, LruCache};
///
/// let cache = LruCache::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// assert_eq!(cache.get("a"), Some(1)); // "a" is now most recent
///
/// cache.set("c", 3); // evicts "b"
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.len(), 2);
/// ```
pub struct LruCache<V> {
    limit: usize,
    inner: Mutex<LruState<V>>,
}

struct LruState<V> {
    map: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V> LruCache<V> {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            inner: Mutex::new(LruState {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Cache<V> for LruCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut state = self.inner.lock();
        let value = state.map.get(key).cloned()?;
        move_key_to_end(&mut state.order, key);
        Some(value)
    }

    fn set(&self, key: &str, value: V) {
        let mut state = self.inner.lock();
        if state.map.insert(key.to_string(), value).is_some() {
            move_key_to_end(&mut state.order, key);
            return;
        }

        state.order.push_back(key.to_string());
        while state.order.len() > self.limit {
            if let Some(evicted) = state.order.pop_front() {
                state.map.remove(&evicted);
            }
        }
    }

    fn clear(&self) {
        let mut state = self.inner.lock();
        state.map.clear();
        state.order.clear();
    }
}

/// Marks `key` as most recently used. O(n) in the number of entries.
fn move_key_to_end(order: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        if let Some(k) = order.remove(pos) {
            order.push_back(k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_missing_key() {
        let cache: LruCache<i32> = LruCache::new(4);
        assert_eq!(cache.get("nope"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = LruCache::new(3);
        cache.set("k1", 1);
        cache.set("k2", 2);
        cache.set("k3", 3);

        // Touch k1 so k2 becomes the eviction candidate
        assert_eq!(cache.get("k1"), Some(1));
        cache.set("k4", 4);

        assert_eq!(cache.get("k2"), None);
        assert_eq!(cache.get("k1"), Some(1));
        assert_eq!(cache.get("k3"), Some(3));
        assert_eq!(cache.get("k4"), Some(4));
    }

    #[test]
    fn test_overwrite_refreshes_position() {
        let cache = LruCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        cache.set("c", 3);

        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_limit_keeps_one_entry() {
        let cache = LruCache::new(0);
        assert_eq!(cache.limit(), 1);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache = LruCache::new(8);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_concurrent_inserts_respect_limit() {
        let cache = Arc::new(LruCache::new(50));
        let mut handles = vec![];

        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    cache.set(&format!("t{}-{}", t, i), i);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);
    }
}
