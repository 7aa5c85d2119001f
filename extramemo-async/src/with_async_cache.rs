//! # Memoization over an Async Cache
//!
//! [`MemoizeWithAsyncCache`] wraps an async function with an [`AsyncCache`].
//!
//! Each call builds its key and reads the cache. A `Hit` is returned as is.
//! On a `Miss` the call joins the computation already in flight for the key
//! if there is one, and otherwise originates it. The computation times the
//! function and, when it succeeds and ran at least the execution-time
//! threshold, writes the result to the cache before releasing the key. It
//! does so even if the originating call was cancelled, as long as a joined
//! caller is still waiting on it.
//!
//! Failures are never cached and never hidden: an origin error reaches the
//! originator and every caller that joined it, and cache errors propagate to
//! the call that hit them.

use crate::pending::{Pending, PendingCalls, PendingGuard, Refreshed};
use extramemo_core::{AsyncCache, CacheRead, MemoizeError, MemoizeOptions, State};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "stats")]
use extramemo_core::MemoStats;

type Outcome<V, E> = Result<Refreshed<V>, E>;

/// An async function memoized over an [`AsyncCache`].
///
/// Build one with [`memoize_with_async_cache`].
pub struct MemoizeWithAsyncCache<A, V, E, F, C> {
    cache: Arc<C>,
    options: MemoizeOptions<A>,
    func: Arc<F>,
    pending: PendingCalls<Outcome<V, E>>,
    #[cfg(feature = "stats")]
    stats: MemoStats,
    _marker: PhantomData<fn(A)>,
}

/// Wraps `func` so that calls are answered from `cache` and concurrent calls
/// with equal keys share one computation.
///
/// # Examples
///
/// ```
/// use extramemo_async::{memoize_with_async_cache, MemoryAsyncCache};
/// use extramemo_core::{MemoizeOptions, State};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lookup = memoize_with_async_cache(
///     MemoryAsyncCache::new(),
///     MemoizeOptions::new().name("lookup"),
///     |id: u32| async move { Ok::<_, std::io::ErrorKind>(id * 10) },
/// );
///
/// assert_eq!(lookup.call_verbose(4).await.unwrap(), (40, State::Miss));
/// assert_eq!(lookup.call_verbose(4).await.unwrap(), (40, State::Hit));
/// # }
/// ```
pub fn memoize_with_async_cache<A, V, E, F, Fut, C>(
    cache: C,
    options: MemoizeOptions<A>,
    func: F,
) -> MemoizeWithAsyncCache<A, V, E, F, C>
where
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    C: AsyncCache<V> + 'static,
{
    MemoizeWithAsyncCache {
        cache: Arc::new(cache),
        options,
        func: Arc::new(func),
        pending: PendingCalls::new(),
        #[cfg(feature = "stats")]
        stats: MemoStats::new(),
        _marker: PhantomData,
    }
}

impl<A, V, E, F, Fut, C> MemoizeWithAsyncCache<A, V, E, F, C>
where
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    C: AsyncCache<V> + 'static,
{
    /// Calls the memoized function and returns its value.
    pub async fn call(&self, args: A) -> Result<V, MemoizeError<E>> {
        self.call_verbose(args).await.map(|(value, _)| value)
    }

    /// Calls the memoized function and reports how the call was served.
    ///
    /// The state is `Hit` or `Miss`. A call that joined another caller's
    /// in-flight computation reports `Miss`, the same as the originator.
    pub async fn call_verbose(&self, args: A) -> Result<(V, State), MemoizeError<E>> {
        let key = self.options.build_key(&args)?;

        if let CacheRead::Hit(value) = self.cache.get(&key).await? {
            debug!(key = %key, name = ?self.options.get_name(), "cache hit");
            self.record(State::Hit);
            return Ok((value, State::Hit));
        }

        match self
            .pending
            .join_or_start(&key, |guard| self.refresh(args, guard))
        {
            Pending::Joined(call) => {
                debug!(key = %key, name = ?self.options.get_name(), "joining in-flight call");
                self.record(State::Reuse);
                match call.await {
                    Ok(refreshed) => Ok((refreshed.value, State::Miss)),
                    Err(err) => Err(self.origin_failed(err)),
                }
            }
            Pending::Started(call) => {
                debug!(key = %key, name = ?self.options.get_name(), "cache miss, refreshing");
                self.record(State::Miss);
                match call.await {
                    Ok(Refreshed {
                        write_error: Some(err),
                        ..
                    }) => {
                        #[cfg(feature = "stats")]
                        self.stats.record_refresh_failure();
                        Err(err.into())
                    }
                    Ok(refreshed) => Ok((refreshed.value, State::Miss)),
                    Err(err) => Err(self.origin_failed(err)),
                }
            }
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn options(&self) -> &MemoizeOptions<A> {
        &self.options
    }

    /// Number of keys with a computation currently in flight.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &MemoStats {
        &self.stats
    }

    /// The shared computation for one key: run the function, cache the value
    /// when it qualifies, then release the key.
    ///
    /// Only owned handles are captured, so the computation outlives the call
    /// that started it.
    fn refresh(
        &self,
        args: A,
        guard: PendingGuard<Outcome<V, E>>,
    ) -> impl Future<Output = Outcome<V, E>> + Send + 'static {
        let func = Arc::clone(&self.func);
        let cache = Arc::clone(&self.cache);
        let gate = self.options.gate();
        async move {
            let started = gate.start();
            let value = match func(args).await {
                Ok(value) => value,
                Err(err) => return Err(err),
            };

            let mut write_error = None;
            if gate.should_cache(started) {
                if let Err(err) = cache.set(guard.key(), value.clone()).await {
                    warn!(key = %guard.key(), error = %err, "cache write failed");
                    write_error = Some(err);
                }
            } else {
                debug!(key = %guard.key(), "execution below threshold, result not cached");
            }

            drop(guard);
            Ok(Refreshed { value, write_error })
        }
    }

    fn origin_failed(&self, err: E) -> MemoizeError<E> {
        #[cfg(feature = "stats")]
        self.stats.record_refresh_failure();
        MemoizeError::Origin(err)
    }

    #[inline]
    fn record(&self, _state: State) {
        #[cfg(feature = "stats")]
        self.stats.record(_state);
    }
}

impl<A, V, E, F, C> fmt::Debug for MemoizeWithAsyncCache<A, V, E, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizeWithAsyncCache")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
