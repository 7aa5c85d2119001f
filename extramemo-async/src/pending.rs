//! # Pending-Call Registry
//!
//! Tracks the computation each memoizer currently has in flight per cache key.
//!
//! A call that finds no live entry for its key registers one and becomes the
//! originator; every call arriving before that computation settles joins it
//! instead of starting another. The check and the insert happen under one
//! map entry lock, so at most one entry per key is ever live, even with tasks
//! running on several worker threads.
//!
//! The entry belongs to the computation, not to the caller that started it.
//! The registered future owns a [`PendingGuard`] and releases the entry when it
//! completes or is dropped, so a cancelled originator leaves the computation
//! (and its cache write) to whichever joined caller keeps polling it. The map
//! only holds a weak handle: once every caller has gone away the computation
//! is dropped and the entry with it.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use extramemo_core::CacheError;
use futures::future::{BoxFuture, Shared, WeakShared};
use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A cloneable handle to an in-flight computation.
pub type SharedCall<T> = Shared<BoxFuture<'static, T>>;

/// A successful refresh, as handed to every caller sharing it.
#[derive(Clone, Debug)]
pub struct Refreshed<V> {
    pub value: V,
    /// Set when the value could not be written to the cache.
    pub write_error: Option<CacheError>,
}

/// Outcome of [`PendingCalls::join_or_start`].
pub enum Pending<T> {
    /// Another caller already has this key in flight.
    Joined(SharedCall<T>),
    /// This caller registered a new computation.
    Started(SharedCall<T>),
}

struct PendingEntry<T> {
    id: u64,
    call: WeakShared<BoxFuture<'static, T>>,
}

struct Registry<T> {
    calls: DashMap<String, PendingEntry<T>>,
    next_id: AtomicU64,
}

/// In-flight computations of one memoizer, keyed by cache key.
pub struct PendingCalls<T> {
    registry: Arc<Registry<T>>,
}

impl<T> PendingCalls<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                calls: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Joins the computation in flight for `key`, or registers the one built
    /// by `start`.
    ///
    /// `start` receives the guard of the new entry and must move it into the
    /// future it returns. It runs under the map entry lock, so it should only
    /// build a lazy future: the work happens on first poll.
    pub fn join_or_start<S, Fut>(&self, key: &str, start: S) -> Pending<T>
    where
        S: FnOnce(PendingGuard<T>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        match self.registry.calls.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get().call.upgrade() {
                Some(call) => Pending::Joined(call),
                None => {
                    // Every caller of the previous computation went away
                    let (call, pending) = self.register(key, start);
                    if let Some(pending) = pending {
                        entry.insert(pending);
                    }
                    Pending::Started(call)
                }
            },
            Entry::Vacant(entry) => {
                let (call, pending) = self.register(key, start);
                if let Some(pending) = pending {
                    entry.insert(pending);
                }
                Pending::Started(call)
            }
        }
    }

    fn register<S, Fut>(&self, key: &str, start: S) -> (SharedCall<T>, Option<PendingEntry<T>>)
    where
        S: FnOnce(PendingGuard<T>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = PendingGuard {
            registry: Arc::clone(&self.registry),
            key: key.to_string(),
            id,
        };
        let call = start(guard).boxed().shared();
        let pending = call.downgrade().map(|call| PendingEntry { id, call });
        (call, pending)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.calls.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.registry.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.calls.is_empty()
    }
}

impl<T> Default for PendingCalls<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Releases a registry entry when the computation owning it completes or is
/// dropped.
pub struct PendingGuard<T> {
    registry: Arc<Registry<T>>,
    key: String,
    id: u64,
}

impl<T> PendingGuard<T> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Drop for PendingGuard<T> {
    fn drop(&mut self) {
        // A newer computation may already have replaced an abandoned entry
        let id = self.id;
        self.registry.calls.remove_if(&self.key, |_, entry| entry.id == id);
    }
}
