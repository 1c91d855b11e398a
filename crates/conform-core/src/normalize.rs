//! Key normalization for records fetched from capitalized-field sources.
//!
//! Configuration history records name their fields `ResourceId`,
//! `Configuration`, ... while baselines and delivered items use
//! `resourceId`, `configuration`, ... Normalizing rewrites the first
//! character of every object key to lower case, at every depth.
//!
//! Only ASCII upper-case leading characters are rewritten; keys starting
//! with any other character pass through unchanged.

use crate::value::{Map, Value};
use std::borrow::Cow;

/// Lower-case the first character of `key` if it is ASCII upper-case.
pub fn lower_first_ascii(key: &str) -> Cow<'_, str> {
    match key.chars().next() {
        Some(first) if first.is_ascii_uppercase() => {
            let mut lowered = String::with_capacity(key.len());
            lowered.push(first.to_ascii_lowercase());
            lowered.push_str(&key[first.len_utf8()..]);
            Cow::Owned(lowered)
        }
        _ => Cow::Borrowed(key),
    }
}

/// Recursively normalize object keys through objects and arrays.
///
/// Shape-preserving: scalars are returned unchanged and arrays keep their
/// order. When a rewritten key collides with a key that was already
/// lower-case in the source (`AB` next to `aB`), the original lower-case
/// entry wins.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        scalar => scalar,
    }
}

fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = normalize_keys(value);
        match lower_first_ascii(&key) {
            Cow::Borrowed(_) => {
                out.insert(key, value);
            }
            Cow::Owned(lowered) => {
                if !out.contains_key(&lowered) {
                    out.insert(lowered, value);
                }
            }
        }
    }
    out
}
