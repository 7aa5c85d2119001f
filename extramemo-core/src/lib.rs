//! # Extramemo Core
//!
//! Core traits and utilities for the extramemo memoization library.
//!
//! This crate provides the building blocks shared by every memoizer: the cache
//! ports a memoizer reads from and writes to, cache key derivation, the
//! execution-time gate that decides whether a result is worth caching, and the
//! call state classification reported by verbose calls.
//!
//! ## Features
//!
//! - **Cache Ports**: Narrow `get`/`set`/`clear` contracts for sync, async and
//!   stale-if-error stores
//! - **Key Building**: Stable JSON keys by default, pluggable per memoizer
//! - **Execution-Time Gate**: Only cache results whose computation was slow enough
//! - **LRU Cache**: A bounded in-process cache for the synchronous memoizer
//! - **Statistics**: Per-memoizer hit/miss/stale/reuse counters (with `stats` feature)
//!
//! ## Module Organization
//!
//! - [`cache`] - Cache port traits
//! - [`key`] - Cache key derivation
//! - [`gate`] - Execution-time threshold
//! - [`state`] - Call state and cache read results
//! - [`memoize`] - Synchronous memoizer
//!
mod cache_entry;
mod error;
mod lru;
mod options;

pub mod cache;
pub mod gate;
pub mod key;
pub mod memoize;
pub mod state;

#[cfg(feature = "stats")]
mod stats;

pub use cache::{AsyncCache, Cache, StaleIfErrorCache};
pub use cache_entry::CacheEntry;
pub use error::{CacheError, KeyError, MemoizeError};
pub use gate::ExecutionTimeGate;
pub use key::{FnKeyBuilder, JsonKeyBuilder, KeyBuilder};
pub use lru::LruCache;
pub use memoize::{memoize, Memoize};
pub use options::MemoizeOptions;
pub use state::{CacheRead, StaleRead, State};

#[cfg(feature = "stats")]
pub use stats::MemoStats;
