use crate::State;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-memoizer statistics.
///
/// Every call is counted exactly once, when it is classified and before it
/// waits on any computation: `Hit` for a fresh read, `Miss` or `StaleIfError`
/// for a call that starts a refresh (by what the cache held), `Reuse` for a
/// call that joins one. Failed calls are therefore still part of
/// [`total_calls`](MemoStats::total_calls). Calls that observed a failed
/// refresh, their own or one they joined, are additionally counted in
/// [`refresh_failures`](MemoStats::refresh_failures).
///
/// # Thread Safety
///
/// All counters are atomics updated with `Relaxed` ordering.
///
/// # Examples
///
/// ```
/// use extramemo_core::{MemoStats, State};
///
/// let stats = MemoStats::new();
///
/// stats.record(State::Hit);
/// stats.record(State::Hit);
/// stats.record(State::Miss);
/// stats.record(State::Reuse);
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.reuses(), 1);
/// assert_eq!(stats.total_calls(), 4);
/// assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug)]
pub struct MemoStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stale: AtomicU64,
    reuses: AtomicU64,
    refresh_failures: AtomicU64,
}

impl MemoStats {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale: AtomicU64::new(0),
            reuses: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        }
    }

    /// Records a call served with `state`.
    #[inline]
    pub fn record(&self, state: State) {
        let counter = match state {
            State::Hit => &self.hits,
            State::Miss => &self.misses,
            State::StaleIfError => &self.stale,
            State::Reuse => &self.reuses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a call that observed a failed origin call or cache write.
    #[inline]
    pub fn record_refresh_failure(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Calls that found only a stale entry and started a refresh for it.
    #[inline]
    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reuses(&self) -> u64 {
        self.reuses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn refresh_failures(&self) -> u64 {
        self.refresh_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_calls(&self) -> u64 {
        self.hits() + self.misses() + self.stale() + self.reuses()
    }

    /// Fraction of calls answered from a fresh cache entry (0.0 to 1.0).
    ///
    /// Returns 0.0 if there have been no calls.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.stale.store(0, Ordering::Relaxed);
        self.reuses.store(0, Ordering::Relaxed);
        self.refresh_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for MemoStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            stale: AtomicU64::new(self.stale()),
            reuses: AtomicU64::new(self.reuses()),
            refresh_failures: AtomicU64::new(self.refresh_failures()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats() {
        let stats = MemoStats::new();
        assert_eq!(stats.total_calls(), 0);
        assert_eq!(stats.refresh_failures(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_each_state() {
        let stats = MemoStats::new();
        stats.record(State::Hit);
        stats.record(State::Miss);
        stats.record(State::Miss);
        stats.record(State::StaleIfError);
        stats.record(State::Reuse);
        stats.record_refresh_failure();

        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 2);
        assert_eq!(stats.stale(), 1);
        assert_eq!(stats.reuses(), 1);
        assert_eq!(stats.refresh_failures(), 1);
        assert_eq!(stats.total_calls(), 5);
    }

    #[test]
    fn test_reset() {
        let stats = MemoStats::new();
        stats.record(State::Hit);
        stats.record_refresh_failure();

        stats.reset();
        assert_eq!(stats.total_calls(), 0);
        assert_eq!(stats.refresh_failures(), 0);
    }

    #[test]
    fn test_clone_is_a_snapshot() {
        let stats = MemoStats::new();
        stats.record(State::Hit);

        let snapshot = stats.clone();
        stats.record(State::Hit);

        assert_eq!(stats.hits(), 2);
        assert_eq!(snapshot.hits(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(MemoStats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let stats_clone = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats_clone.record(State::Hit);
                }
                for _ in 0..50 {
                    stats_clone.record(State::Reuse);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.hits(), 1000);
        assert_eq!(stats.reuses(), 500);
        assert_eq!(stats.total_calls(), 1500);
    }
}
