//! # Cache Key Derivation
//!
//! A memoizer treats two calls as equal exactly when their keys are equal, so a
//! key builder must be deterministic: equal arguments always give equal keys.
//!
//! The default [`JsonKeyBuilder`] serializes the arguments through
//! [`serde_json::Value`] and rebuilds every object with its entries sorted by
//! key. Two maps with the same entries therefore produce the same key whatever
//! order they were built in, even when serde_json's `preserve_order` feature
//! is enabled somewhere in the dependency graph.
//!
//! When a memoizer has a `name`, the name is folded into the key. Functions
//! sharing one cache then never read each other's entries for equal arguments.

use crate::KeyError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Maps call arguments (and an optional memoizer name) to a cache key.
pub trait KeyBuilder<A: ?Sized>: Send + Sync {
    fn build_key(&self, args: &A, name: Option<&str>) -> Result<String, KeyError>;
}

/// Default key builder: stable JSON text of the arguments.
///
/// Without a name the key is the JSON of `args`; with a name it is the JSON of
/// the pair `[name, args]`.
///
/// # Examples
///
/// ```
/// use extramemo_core::{JsonKeyBuilder, KeyBuilder};
///
/// let key = JsonKeyBuilder.build_key(&("user", 42), None).unwrap();
/// assert_eq!(key, r#"["user",42]"#);
///
/// let named = JsonKeyBuilder.build_key(&("user", 42), Some("profile")).unwrap();
/// assert_eq!(named, r#"["profile",["user",42]]"#);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonKeyBuilder;

impl<A> KeyBuilder<A> for JsonKeyBuilder
where
    A: Serialize + ?Sized,
{
    fn build_key(&self, args: &A, name: Option<&str>) -> Result<String, KeyError> {
        let args = canonicalize(serde_json::to_value(args)?);
        let key = match name {
            Some(name) => serde_json::to_string(&(name, &args))?,
            None => serde_json::to_string(&args)?,
        };
        Ok(key)
    }
}

/// Rebuilds every object in `value` with its entries in key order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Adapts a closure into a [`KeyBuilder`].
///
/// The closure is responsible for folding `name` into the key when it cares
/// about sharing a cache between functions.
///
/// # Examples
///
/// ```
/// use extramemo_core::{FnKeyBuilder, KeyBuilder};
///
/// let builder = FnKeyBuilder::new(|id: &u64, name: Option<&str>| {
///     format!("{}:{}", name.unwrap_or("anon"), id)
/// });
/// assert_eq!(builder.build_key(&7, Some("user")).unwrap(), "user:7");
/// ```
#[derive(Clone, Copy)]
pub struct FnKeyBuilder<F>(F);

impl<F> FnKeyBuilder<F> {
    pub fn new(f: F) -> Self {
        FnKeyBuilder(f)
    }
}

impl<F> fmt::Debug for FnKeyBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKeyBuilder").finish_non_exhaustive()
    }
}

impl<A, F> KeyBuilder<A> for FnKeyBuilder<F>
where
    A: ?Sized,
    F: Fn(&A, Option<&str>) -> String + Send + Sync,
{
    fn build_key(&self, args: &A, name: Option<&str>) -> Result<String, KeyError> {
        Ok((self.0)(args, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};
    use std::collections::HashMap;

    #[test]
    fn test_equal_args_give_equal_keys() {
        let a = JsonKeyBuilder.build_key(&("foo", 1, true), None).unwrap();
        let b = JsonKeyBuilder.build_key(&("foo", 1, true), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_map_key_order_does_not_matter() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..32 {
            first.insert(format!("k{}", i), i);
        }
        for i in (0..32).rev() {
            second.insert(format!("k{}", i), i);
        }

        let a = JsonKeyBuilder.build_key(&first, None).unwrap();
        let b = JsonKeyBuilder.build_key(&second, None).unwrap();
        assert_eq!(a, b);
    }

    /// Emits its entries in the given order, like a map type that keeps
    /// insertion order.
    struct OrderedEntries(Vec<(&'static str, Vec<(&'static str, u32)>)>);

    impl Serialize for OrderedEntries {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeMap;

            let mut outer = serializer.serialize_map(Some(self.0.len()))?;
            for (key, inner) in &self.0 {
                outer.serialize_entry(key, &InnerEntries(inner.clone()))?;
            }
            outer.end()
        }
    }

    struct InnerEntries(Vec<(&'static str, u32)>);

    impl Serialize for InnerEntries {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
        }
    }

    #[test]
    fn test_entry_order_does_not_matter_at_any_depth() {
        let first = OrderedEntries(vec![
            ("b", vec![("y", 2), ("x", 1)]),
            ("a", vec![("z", 3)]),
        ]);
        let second = OrderedEntries(vec![
            ("a", vec![("z", 3)]),
            ("b", vec![("x", 1), ("y", 2)]),
        ]);

        let a = JsonKeyBuilder.build_key(&first, None).unwrap();
        let b = JsonKeyBuilder.build_key(&second, Some("f")).unwrap();
        assert_eq!(a, r#"{"a":{"z":3},"b":{"x":1,"y":2}}"#);
        assert_eq!(b, r#"["f",{"a":{"z":3},"b":{"x":1,"y":2}}]"#);
    }

    #[test]
    fn test_canonicalize_sorts_objects_inside_arrays() {
        let mut unsorted = Map::new();
        unsorted.insert("second".to_string(), Value::from(2));
        unsorted.insert("first".to_string(), Value::from(1));
        let value = Value::Array(vec![Value::Object(unsorted), Value::Null]);

        let text = canonicalize(value).to_string();
        assert_eq!(text, r#"[{"first":1,"second":2},null]"#);
    }

    #[test]
    fn test_name_disambiguates_equal_args() {
        let plain = JsonKeyBuilder.build_key(&"foo", None).unwrap();
        let users = JsonKeyBuilder.build_key(&"foo", Some("users")).unwrap();
        let posts = JsonKeyBuilder.build_key(&"foo", Some("posts")).unwrap();

        assert_eq!(plain, "\"foo\"");
        assert_ne!(users, posts);
        assert_ne!(plain, users);
    }

    #[test]
    fn test_serialization_failure_is_reported() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("not a key"))
            }
        }

        let err = JsonKeyBuilder.build_key(&Unserializable, None).unwrap_err();
        assert!(err.to_string().contains("not a key"));
    }

    #[test]
    fn test_fn_key_builder() {
        let builder = FnKeyBuilder::new(|text: &str, _name: Option<&str>| text.to_uppercase());
        assert_eq!(builder.build_key("abc", None).unwrap(), "ABC");
    }
}
