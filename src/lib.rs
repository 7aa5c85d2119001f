//! # Extramemo
//!
//! Function memoization with pluggable caches.
//!
//! Extramemo wraps a function so repeated calls with equal arguments are
//! answered from a cache, and gives explicit control over what gets cached and
//! what happens when things fail:
//!
//! - **Pluggable caches**: any store implementing [`Cache`], [`AsyncCache`] or
//!   [`StaleIfErrorCache`]
//! - **Request coalescing**: concurrent async calls with equal keys share one execution
//! - **Execution-time threshold**: cache only results that were slow to compute
//! - **Stale-if-error**: serve an expired value when refreshing it fails
//! - **Stable keys**: arguments serialized to JSON with object keys sorted at every depth
//!
//! ## Quick Start
//!
//! A synchronous function over an LRU cache:
//!
//! ```rust
//! use extramemo::{memoize, LruCache, MemoizeOptions};
//!
//! let fibonacci = memoize(LruCache::new(256), MemoizeOptions::new(), |n: u32| {
//!     (0..n).fold((0u64, 1u64), |(a, b), _| (b, a + b)).0
//! });
//!
//! assert_eq!(fibonacci.call(50).unwrap(), 12_586_269_025);
//! ```
//!
//! An async function that falls back to a stale value when its origin fails:
//!
//! ```rust
//! use extramemo::{memoize_async_stale_if_error, MemoizeOptions, MemoryStaleIfErrorCache, State};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = MemoryStaleIfErrorCache::new(Duration::from_secs(30))
//!     .stale_if_error(Duration::from_secs(300));
//!
//! let rates = memoize_async_stale_if_error(
//!     cache,
//!     MemoizeOptions::new().name("exchange_rate"),
//!     |pair: (String, String)| async move {
//!         Ok::<_, String>(format!("{}/{} = 1.08", pair.0, pair.1))
//!     },
//! )
//! .on_stale_fallback(|key, err| eprintln!("serving stale {}: {:?}", key, err));
//!
//! let (rate, state) = rates
//!     .call_verbose(("EUR".into(), "USD".into()))
//!     .await
//!     .unwrap();
//! assert_eq!(rate, "EUR/USD = 1.08");
//! assert_eq!(state, State::Miss);
//! # }
//! ```
//!
//! ## Sharing a Cache
//!
//! Several memoized functions can share one store (wrap it in an `Arc`). Give
//! each one a `name` so equal arguments to different functions do not collide:
//!
//! ```rust
//! use extramemo::{memoize, LruCache, MemoizeOptions};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(LruCache::new(100));
//! let len = memoize(Arc::clone(&cache), MemoizeOptions::new().name("len"), |s: String| s.len());
//! let words = memoize(Arc::clone(&cache), MemoizeOptions::new().name("words"), |s: String| {
//!     s.split_whitespace().count()
//! });
//!
//! assert_eq!(len.call("a b c".into()).unwrap(), 5);
//! assert_eq!(words.call("a b c".into()).unwrap(), 3);
//! ```

pub use extramemo_async::{
    memoize_async_stale_if_error, memoize_with_async_cache, MemoizeAsyncStaleIfError,
    MemoizeWithAsyncCache, MemoryAsyncCache, MemoryStaleIfErrorCache, PendingCalls,
    StaleFallbackHook,
};
pub use extramemo_async::async_trait;
pub use extramemo_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use extramemo_async::prelude::*;
    pub use extramemo_core::{memoize, Cache, LruCache};
}
