//! # Extramemo Async
//!
//! Memoization for async functions with request coalescing and stale-if-error
//! fallback.
//!
//! Two memoizers are provided:
//!
//! - [`memoize_with_async_cache`] - backed by an [`AsyncCache`](extramemo_core::AsyncCache)
//!   reporting `Hit`/`Miss`
//! - [`memoize_async_stale_if_error`] - backed by a
//!   [`StaleIfErrorCache`](extramemo_core::StaleIfErrorCache); a failed refresh
//!   of an expired entry serves the expired value instead of the error
//!
//! ## Features
//!
//! - **Request coalescing**: concurrent calls with equal keys share one
//!   execution of the wrapped function
//! - **Execution-time threshold**: only results that took long enough are cached
//! - **Stale-if-error**: availability over freshness when the origin fails
//! - **Verbose calls**: `call_verbose` reports how each call was served
//! - **Statistics**: per-memoizer counters (with the `stats` feature)
//!
//! ## Quick Start
//!
//! ```
//! use extramemo_async::{memoize_with_async_cache, MemoryAsyncCache};
//! use extramemo_core::MemoizeOptions;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fetch = memoize_with_async_cache(
//!     MemoryAsyncCache::with_ttl(Duration::from_secs(60)),
//!     MemoizeOptions::new().execution_time_threshold(Duration::from_millis(10)),
//!     |url: String| async move {
//!         tokio::time::sleep(Duration::from_millis(20)).await;
//!         Ok::<_, String>(format!("body of {}", url))
//!     },
//! );
//!
//! // Both calls share a single execution
//! let (a, b) = tokio::join!(
//!     fetch.call("https://example.com".to_string()),
//!     fetch.call("https://example.com".to_string()),
//! );
//! assert_eq!(a.unwrap(), b.unwrap());
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! Memoizers are `Send + Sync` when their function and cache are, and can be
//! shared across tasks behind an `Arc`. The pending-call registry uses
//! [DashMap](https://docs.rs/dashmap) so checking for and registering an
//! in-flight call is a single atomic step.

mod memory;
mod pending;
mod stale_if_error;
mod with_async_cache;

pub use memory::{MemoryAsyncCache, MemoryStaleIfErrorCache};
pub use pending::{Pending, PendingCalls, PendingGuard, Refreshed, SharedCall};
pub use stale_if_error::{memoize_async_stale_if_error, MemoizeAsyncStaleIfError, StaleFallbackHook};
pub use with_async_cache::{memoize_with_async_cache, MemoizeWithAsyncCache};

// Re-export common dependencies that users might need
pub use async_trait::async_trait;
pub use extramemo_core;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        memoize_async_stale_if_error, memoize_with_async_cache, MemoryAsyncCache,
        MemoryStaleIfErrorCache,
    };
    pub use extramemo_core::{
        AsyncCache, CacheError, CacheRead, MemoizeError, MemoizeOptions, StaleIfErrorCache,
        StaleRead, State,
    };
}
