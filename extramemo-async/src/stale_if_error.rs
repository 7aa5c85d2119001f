//! # Stale-If-Error Memoization
//!
//! [`MemoizeAsyncStaleIfError`] wraps an async function with a
//! [`StaleIfErrorCache`], a cache that can hand back an expired entry as a
//! fallback. Calls are classified by the synchronous cache read:
//!
//! | read | in flight for key | success | failure |
//! |---|---|---|---|
//! | `Hit` | - | cached value, `Hit` | - |
//! | `StaleIfError` | yes | joined value, `Reuse` | stale value, `StaleIfError` |
//! | `StaleIfError` | no | refreshed value, `StaleIfError` | stale value, `StaleIfError` |
//! | `Miss` | yes | joined value, `Reuse` | error |
//! | `Miss` | no | refreshed value, `Miss` | error |
//!
//! A refresh failure never reaches a caller that holds a stale value. Those
//! swallowed failures are logged at `warn` level and can be observed with
//! [`MemoizeAsyncStaleIfError::on_stale_fallback`].
//!
//! The refresh itself, including its cache write, is shared by every caller
//! of the key and completes even if the caller that started it is cancelled.

use crate::pending::{Pending, PendingCalls, PendingGuard, Refreshed};
use extramemo_core::{MemoizeError, MemoizeOptions, StaleIfErrorCache, StaleRead, State};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "stats")]
use extramemo_core::MemoStats;

/// Hook invoked with the key and the error whenever a stale value is served
/// in place of a failed refresh.
pub type StaleFallbackHook<E> = Arc<dyn Fn(&str, &MemoizeError<E>) + Send + Sync>;

type Outcome<V, E> = Result<Refreshed<V>, E>;

/// An async function memoized over a [`StaleIfErrorCache`].
///
/// Build one with [`memoize_async_stale_if_error`].
pub struct MemoizeAsyncStaleIfError<A, V, E, F, C> {
    cache: Arc<C>,
    options: MemoizeOptions<A>,
    func: Arc<F>,
    pending: PendingCalls<Outcome<V, E>>,
    on_stale_fallback: Option<StaleFallbackHook<E>>,
    #[cfg(feature = "stats")]
    stats: MemoStats,
    _marker: PhantomData<fn(A)>,
}

/// Wraps `func` so that calls are answered from `cache`, concurrent calls with
/// equal keys share one computation, and stale entries stand in for failed
/// refreshes.
///
/// # Examples
///
/// ```
/// use extramemo_async::{memoize_async_stale_if_error, MemoryStaleIfErrorCache};
/// use extramemo_core::{MemoizeOptions, State};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = MemoryStaleIfErrorCache::new(Duration::from_secs(60))
///     .stale_if_error(Duration::from_secs(3600));
///
/// let price = memoize_async_stale_if_error(
///     cache,
///     MemoizeOptions::new(),
///     |symbol: String| async move { Ok::<_, String>(symbol.len() as u32) },
/// );
///
/// let (value, state) = price.call_verbose("ACME".to_string()).await.unwrap();
/// assert_eq!((value, state), (4, State::Miss));
/// # }
/// ```
pub fn memoize_async_stale_if_error<A, V, E, F, Fut, C>(
    cache: C,
    options: MemoizeOptions<A>,
    func: F,
) -> MemoizeAsyncStaleIfError<A, V, E, F, C>
where
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    C: StaleIfErrorCache<V> + 'static,
{
    MemoizeAsyncStaleIfError {
        cache: Arc::new(cache),
        options,
        func: Arc::new(func),
        pending: PendingCalls::new(),
        on_stale_fallback: None,
        #[cfg(feature = "stats")]
        stats: MemoStats::new(),
        _marker: PhantomData,
    }
}

impl<A, V, E, F, Fut, C> MemoizeAsyncStaleIfError<A, V, E, F, C>
where
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    C: StaleIfErrorCache<V> + 'static,
{
    /// Registers a hook called whenever a failed refresh is replaced by a stale value.
    ///
    /// The hook only observes; the caller still receives the stale value.
    pub fn on_stale_fallback<H>(mut self, hook: H) -> Self
    where
        H: Fn(&str, &MemoizeError<E>) + Send + Sync + 'static,
    {
        self.on_stale_fallback = Some(Arc::new(hook));
        self
    }

    /// Calls the memoized function and returns its value.
    pub async fn call(&self, args: A) -> Result<V, MemoizeError<E>> {
        self.call_verbose(args).await.map(|(value, _)| value)
    }

    /// Calls the memoized function and reports how the call was served.
    pub async fn call_verbose(&self, args: A) -> Result<(V, State), MemoizeError<E>> {
        let key = self.options.build_key(&args)?;

        let stale = match self.cache.get(&key)? {
            StaleRead::Hit(value) => {
                debug!(key = %key, name = ?self.options.get_name(), "cache hit");
                self.record(State::Hit);
                return Ok((value, State::Hit));
            }
            StaleRead::StaleIfError(value) => Some(value),
            StaleRead::Miss => None,
        };

        match self
            .pending
            .join_or_start(&key, |guard| self.refresh(args, guard))
        {
            Pending::Joined(call) => {
                debug!(key = %key, stale = stale.is_some(), "joining in-flight call");
                self.record(State::Reuse);
                match call.await {
                    Ok(refreshed) => Ok((refreshed.value, State::Reuse)),
                    Err(err) => self.fall_back(&key, MemoizeError::Origin(err), stale),
                }
            }
            Pending::Started(call) => {
                let state = if stale.is_some() {
                    State::StaleIfError
                } else {
                    State::Miss
                };
                debug!(key = %key, state = %state, "refreshing");
                self.record(state);
                match call.await {
                    Ok(Refreshed {
                        write_error: Some(err),
                        ..
                    }) => self.fall_back(&key, err.into(), stale),
                    Ok(refreshed) => Ok((refreshed.value, state)),
                    Err(err) => self.fall_back(&key, MemoizeError::Origin(err), stale),
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
                if let Err(err) = cache.set(guard.key(), value.clone()) {
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

    /// Serves `stale` in place of a failed refresh, or propagates the failure
    /// when there is nothing to fall back to.
    fn fall_back(
        &self,
        key: &str,
        err: MemoizeError<E>,
        stale: Option<V>,
    ) -> Result<(V, State), MemoizeError<E>> {
        #[cfg(feature = "stats")]
        self.stats.record_refresh_failure();

        match stale {
            Some(value) => {
                warn!(
                    key = %key,
                    name = ?self.options.get_name(),
                    error = ?err,
                    "refresh failed, serving stale value"
                );
                if let Some(hook) = &self.on_stale_fallback {
                    hook(key, &err);
                }
                Ok((value, State::StaleIfError))
            }
            None => Err(err),
        }
    }

    #[inline]
    fn record(&self, _state: State) {
        #[cfg(feature = "stats")]
        self.stats.record(_state);
    }
}

impl<A, V, E, F, C> fmt::Debug for MemoizeAsyncStaleIfError<A, V, E, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizeAsyncStaleIfError")
            .field("options", &self.options)
            .field("on_stale_fallback", &self.on_stale_fallback.is_some())
            .finish_non_exhaustive()
    }
}
