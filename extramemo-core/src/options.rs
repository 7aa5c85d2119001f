use crate::{ExecutionTimeGate, FnKeyBuilder, JsonKeyBuilder, KeyBuilder, KeyError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration shared by every memoizer.
///
/// The cache itself is passed to the memoizer constructor; everything else is
/// optional:
///
/// | option | default |
/// |---|---|
/// | `name` | none |
/// | key builder | [`JsonKeyBuilder`] |
/// | `execution_time_threshold` | zero (cache every success) |
///
/// # Examples
///
/// ```
/// use extramemo_core::MemoizeOptions;
/// use std::time::Duration;
///
/// let options = MemoizeOptions::<(u64, String)>::new()
///     .name("fetch_user")
///     .execution_time_threshold(Duration::from_millis(50));
///
/// assert_eq!(options.get_name(), Some("fetch_user"));
/// let key = options.build_key(&(7, "eu".to_string())).unwrap();
/// assert_eq!(key, r#"["fetch_user",[7,"eu"]]"#);
/// ```
pub struct MemoizeOptions<A: ?Sized> {
    name: Option<String>,
    key_builder: Arc<dyn KeyBuilder<A>>,
    gate: ExecutionTimeGate,
}

impl<A> MemoizeOptions<A>
where
    A: Serialize + ?Sized,
{
    /// Options with JSON keys, no name and a zero threshold.
    pub fn new() -> Self {
        Self::with_key_builder(JsonKeyBuilder)
    }
}

impl<A> Default for MemoizeOptions<A>
where
    A: Serialize + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> MemoizeOptions<A> {
    /// Options for arguments that are not `Serialize`.
    pub fn with_key_builder<K>(key_builder: K) -> Self
    where
        K: KeyBuilder<A> + 'static,
    {
        Self {
            name: None,
            key_builder: Arc::new(key_builder),
            gate: ExecutionTimeGate::default(),
        }
    }

    /// Folds `name` into every key so functions can share one cache.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn key_builder<K>(mut self, key_builder: K) -> Self
    where
        K: KeyBuilder<A> + 'static,
    {
        self.key_builder = Arc::new(key_builder);
        self
    }

    /// Shorthand for `key_builder(FnKeyBuilder::new(f))`.
    pub fn key_fn<F>(self, f: F) -> Self
    where
        F: Fn(&A, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.key_builder(FnKeyBuilder::new(f))
    }

    /// Only cache results whose computation took at least `threshold`.
    pub fn execution_time_threshold(mut self, threshold: Duration) -> Self {
        self.gate = ExecutionTimeGate::new(threshold);
        self
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn gate(&self) -> ExecutionTimeGate {
        self.gate
    }

    pub fn build_key(&self, args: &A) -> Result<String, KeyError> {
        self.key_builder.build_key(args, self.name.as_deref())
    }
}

impl<A: ?Sized> Clone for MemoizeOptions<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key_builder: Arc::clone(&self.key_builder),
            gate: self.gate,
        }
    }
}

impl<A: ?Sized> fmt::Debug for MemoizeOptions<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizeOptions")
            .field("name", &self.name)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
