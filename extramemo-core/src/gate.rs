//! Execution-time threshold.

use std::time::Duration;
use tokio::time::Instant;

/// Decides, after a computation succeeds, whether it ran long enough to cache.
///
/// Only computations taking at least `threshold` are cached. The default
/// threshold of zero caches every successful result.
///
/// Time is read from [`tokio::time::Instant`], which follows a paused test
/// clock and falls back to the system clock outside a runtime.
///
/// # Examples
///
/// ```
/// use extramemo_core::ExecutionTimeGate;
/// use std::time::Duration;
///
/// let gate = ExecutionTimeGate::default();
/// let started = gate.start();
/// assert!(gate.should_cache(started));
///
/// let slow_only = ExecutionTimeGate::new(Duration::from_secs(3600));
/// let started = slow_only.start();
/// assert!(!slow_only.should_cache(started));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionTimeGate {
    threshold: Duration,
}

impl ExecutionTimeGate {
    pub const fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Marks the start of a computation.
    #[inline]
    pub fn start(&self) -> Instant {
        Instant::now()
    }

    /// Returns `true` if the computation started at `started` qualifies for caching.
    #[inline]
    pub fn should_cache(&self, started: Instant) -> bool {
        started.elapsed() >= self.threshold
    }
}
