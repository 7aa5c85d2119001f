//! # Synchronous Memoizer
//!
//! Wraps a plain function with a [`Cache`]. There is no coalescing and no
//! staleness: a call either finds its key in the cache or runs the function,
//! and the result is stored when the run took at least the configured
//! execution-time threshold.

use crate::{Cache, KeyError, MemoizeOptions};
use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "stats")]
use crate::{MemoStats, State};

/// A synchronous function wrapped with a cache.
///
/// Build one with [`memoize`].
pub struct Memoize<A, V, F, C> {
    cache: C,
    options: MemoizeOptions<A>,
    func: F,
    #[cfg(feature = "stats")]
    stats: MemoStats,
    _marker: PhantomData<fn(A) -> V>,
}

/// Wraps `func` so repeated calls with equal arguments are answered from `cache`.
///
/// # Examples
///
/// ```
/// use extramemo_core::{memoize, LruCache, MemoizeOptions};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// static CALLS: AtomicU32 = AtomicU32::new(0);
///
/// let square = memoize(LruCache::new(100), MemoizeOptions::new(), |n: u64| {
///     CALLS.fetch_add(1, Ordering::SeqCst);
///     n * n
/// });
///
/// assert_eq!(square.call(12).unwrap(), 144);
/// assert_eq!(square.call(12).unwrap(), 144);
/// assert_eq!(CALLS.load(Ordering::SeqCst), 1);
/// ```
pub fn memoize<A, V, F, C>(cache: C, options: MemoizeOptions<A>, func: F) -> Memoize<A, V, F, C>
where
    V: Clone,
    F: Fn(A) -> V,
    C: Cache<V>,
{
    Memoize {
        cache,
        options,
        func,
        #[cfg(feature = "stats")]
        stats: MemoStats::new(),
        _marker: PhantomData,
    }
}

impl<A, V, F, C> Memoize<A, V, F, C>
where
    V: Clone,
    F: Fn(A) -> V,
    C: Cache<V>,
{
    /// Returns the cached value for `args`, or runs the function.
    ///
    /// Fails only when no key can be built for `args`; the function is not run then.
    pub fn call(&self, args: A) -> Result<V, KeyError> {
        let key = self.options.build_key(&args)?;
        if let Some(value) = self.cache.get(&key) {
            #[cfg(feature = "stats")]
            self.stats.record(State::Hit);
            return Ok(value);
        }

        #[cfg(feature = "stats")]
        self.stats.record(State::Miss);

        let gate = self.options.gate();
        let started = gate.start();
        let value = (self.func)(args);
        if gate.should_cache(started) {
            self.cache.set(&key, value.clone());
        } else {
            tracing::debug!(key = %key, "execution below threshold, result not cached");
        }

        Ok(value)
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn options(&self) -> &MemoizeOptions<A> {
        &self.options
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &MemoStats {
        &self.stats
    }
}

impl<A, V, F, C> fmt::Debug for Memoize<A, V, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoize")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
