//! Call state classification and the tagged values returned by cache reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a memoized call was served.
///
/// # Variants
///
/// * `Hit` - The cache held a fresh value; the origin function was not invoked
/// * `Miss` - No usable value was cached; this call originated a computation
/// * `StaleIfError` - The cache held an expired value that was kept as a fallback
/// * `Reuse` - This call attached to a computation another caller already had in flight
///
/// `Reuse` is never produced by a cache. Memoizers synthesize it when they
/// coalesce a call with one already in flight for the same key.
///
/// # Examples
///
/// ```
/// use extramemo_core::State;
///
/// assert_eq!(State::StaleIfError.to_string(), "stale-if-error");
/// assert!(State::Reuse.is_coalesced());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    Hit,
    Miss,
    StaleIfError,
    Reuse,
}

impl State {
    /// Returns the lower-case name used in logs and serialized output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            State::Hit => "hit",
            State::Miss => "miss",
            State::StaleIfError => "stale-if-error",
            State::Reuse => "reuse",
        }
    }

    /// Returns `true` if the call shared another caller's computation.
    pub const fn is_coalesced(&self) -> bool {
        matches!(self, State::Reuse)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reading a key from an [`AsyncCache`](crate::AsyncCache).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheRead<V> {
    /// The entry exists and is fresh.
    Hit(V),
    /// No entry exists.
    Miss,
}

impl<V> CacheRead<V> {
    pub fn state(&self) -> State {
        match self {
            CacheRead::Hit(_) => State::Hit,
            CacheRead::Miss => State::Miss,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            CacheRead::Hit(value) => Some(value),
            CacheRead::Miss => None,
        }
    }
}

impl<V> From<Option<V>> for CacheRead<V> {
    fn from(value: Option<V>) -> Self {
        value.map_or(CacheRead::Miss, CacheRead::Hit)
    }
}

/// Result of reading a key from a [`StaleIfErrorCache`](crate::StaleIfErrorCache).
///
/// A `StaleIfError` value is past its freshness window. It must only be served
/// when refreshing it fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaleRead<V> {
    Hit(V),
    Miss,
    StaleIfError(V),
}

impl<V> StaleRead<V> {
    pub fn state(&self) -> State {
        match self {
            StaleRead::Hit(_) => State::Hit,
            StaleRead::Miss => State::Miss,
            StaleRead::StaleIfError(_) => State::StaleIfError,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            StaleRead::Hit(value) | StaleRead::StaleIfError(value) => Some(value),
            StaleRead::Miss => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(State::Hit.to_string(), "hit");
        assert_eq!(State::Miss.to_string(), "miss");
        assert_eq!(State::StaleIfError.to_string(), "stale-if-error");
        assert_eq!(State::Reuse.to_string(), "reuse");
    }

    #[test]
    fn test_state_serde_matches_display() {
        let json = serde_json::to_string(&State::StaleIfError).unwrap();
        assert_eq!(json, "\"stale-if-error\"");

        let state: State = serde_json::from_str("\"reuse\"").unwrap();
        assert_eq!(state, State::Reuse);
    }

    #[test]
    fn test_cache_read_from_option() {
        assert_eq!(CacheRead::from(Some(1)), CacheRead::Hit(1));
        assert_eq!(CacheRead::<i32>::from(None), CacheRead::Miss);
        assert_eq!(CacheRead::Hit(1).state(), State::Hit);
        assert_eq!(CacheRead::<i32>::Miss.into_value(), None);
    }

    #[test]
    fn test_stale_read_keeps_fallback_value() {
        let read = StaleRead::StaleIfError("old");
        assert_eq!(read.state(), State::StaleIfError);
        assert_eq!(read.into_value(), Some("old"));
        assert_eq!(StaleRead::<&str>::Miss.into_value(), None);
    }
}
