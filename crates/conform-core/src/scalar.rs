//! Scalar equivalence at comparison leaves.
//!
//! Both sides are reduced to a canonical string first. Equal canonical
//! strings are equivalent; otherwise two cross-representation rules are
//! tried in order:
//!
//! 1. numeric: both sides parse as `f64` and are numerically equal
//!    (`"123"` ≡ `123` ≡ `123.0`)
//! 2. timestamp: one side is an RFC 3339 timestamp and the other a decimal
//!    Unix epoch in seconds denoting the same instant (either order); a
//!    fractional epoch is truncated to whole seconds

use crate::value::{render, Shape, Value};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A non-scalar value was handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("non-null/string/number/bool value ({shape}): {rendered}")]
pub struct NonScalarError {
    pub shape: Shape,
    pub rendered: String,
}

/// Canonical string form of a scalar.
///
/// `null` → `""`, strings → themselves, booleans → `true`/`false`, numbers
/// → their decimal rendering.
///
/// # Errors
///
/// Returns [`NonScalarError`] for arrays and objects.
pub fn canonical_string(value: &Value) -> Result<String, NonScalarError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(NonScalarError {
            shape: Shape::of(value),
            rendered: render(value),
        }),
    }
}

/// Equivalence of two scalar values; non-scalars are never equivalent.
pub fn scalars_equivalent(expected: &Value, observed: &Value) -> bool {
    match (canonical_string(expected), canonical_string(observed)) {
        (Ok(e), Ok(o)) => canonical_equivalent(&e, &o),
        _ => false,
    }
}

/// Equivalence of two canonical strings.
pub fn canonical_equivalent(expected: &str, observed: &str) -> bool {
    expected == observed
        || numbers_equivalent(expected, observed)
        || timestamps_equivalent(expected, observed)
}

/// Both strings parse as `f64` and compare numerically equal.
pub fn numbers_equivalent(a: &str, b: &str) -> bool {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// One side is RFC 3339, the other Unix epoch seconds, same instant.
pub fn timestamps_equivalent(a: &str, b: &str) -> bool {
    rfc3339_matches_epoch(a, b) || rfc3339_matches_epoch(b, a)
}

fn rfc3339_matches_epoch(timestamp: &str, epoch: &str) -> bool {
    let Ok(instant) = DateTime::parse_from_rfc3339(timestamp) else {
        return false;
    };
    let Ok(seconds) = epoch.parse::<f64>() else {
        return false;
    };
    match epoch_to_instant(seconds) {
        Some(other) => instant.with_timezone(&Utc) == other,
        None => false,
    }
}

/// Epoch seconds to an instant, truncating any fraction toward zero;
/// `None` when not finite or out of range.
fn epoch_to_instant(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0)
}
