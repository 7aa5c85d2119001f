//! Error types shared by every memoizer.

use std::error::Error as StdError;
use std::sync::Arc;

/// Failure reported by a cache backend.
///
/// Cache errors are never recovered by a memoizer: they propagate to the caller
/// unchanged. The error is cheap to clone so one failure can be handed to every
/// caller that observed it.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(Arc<dyn StdError + Send + Sync>),

    #[error("cache backend error: {0}")]
    Message(String),
}

impl CacheError {
    /// Wraps an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CacheError::Backend(Arc::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        CacheError::Message(message.into())
    }
}

/// Failure to derive a cache key from call arguments.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("failed to build cache key: {0}")]
pub struct KeyError(String);

impl KeyError {
    pub fn new(message: impl Into<String>) -> Self {
        KeyError(message.into())
    }
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        KeyError(err.to_string())
    }
}

/// Error returned by a memoized call.
///
/// `Origin` carries exactly the error the wrapped function produced, so a caller
/// sees the same failure it would have seen without memoization.
#[derive(Clone, Debug, thiserror::Error)]
pub enum MemoizeError<E> {
    #[error(transparent)]
    Origin(E),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl<E> MemoizeError<E> {
    /// Returns the origin function's error, if that is what failed.
    pub fn into_origin(self) -> Option<E> {
        match self {
            MemoizeError::Origin(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_origin(&self) -> bool {
        matches!(self, MemoizeError::Origin(_))
    }
}
