//! Structural comparator.
//!
//! Walks the expected (baseline) tree and validates the observed (item) tree
//! against it. The expected side is the schema authority: keys only present
//! in the observed document are never inspected, while every expected key
//! must be present and match. The walk stops at the first violation.
//!
//! Dispatch is decided from the shape of the expected node alone:
//!
//! | expected          | observed must be                                   |
//! |-------------------|----------------------------------------------------|
//! | object            | object, or a string encoding an object             |
//! | array             | array of the same length                           |
//! | string (in object)| see [`Comparator::compare_string_target`]          |
//! | other scalar      | an equivalent scalar (see [`crate::scalar`])       |

use crate::compare::model::{CompareOptions, Path, Verdict, Violation, ViolationKind};
use crate::scalar::{canonical_equivalent, canonical_string};
use crate::value::{looks_like_document, render, Map, Shape, Value};
use std::borrow::Cow;

type Outcome = Result<(), Violation>;

/// Stateless comparator; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompareOptions {
        self.options
    }

    /// Compare `observed` against `expected`, returning the first violation.
    pub fn compare(&self, observed: &Value, expected: &Value) -> Verdict {
        match self.dispatch(&Path::root(), observed, expected, 0) {
            Ok(()) => Verdict::Compliant,
            Err(violation) => {
                if self.options.verbose {
                    tracing::debug!(
                        path = %violation.path,
                        violation.code = violation.kind.code(),
                        reason = %violation.reason,
                        "comparison found violation"
                    );
                }
                Verdict::NonCompliant(violation)
            }
        }
    }

    /// Generic dispatch on the shape of `expected`.
    fn dispatch(&self, path: &Path, observed: &Value, expected: &Value, depth: usize) -> Outcome {
        if self.options.verbose {
            tracing::debug!(
                path = %path,
                expected_shape = %Shape::of(expected),
                observed_shape = %Shape::of(observed),
                "compare node"
            );
        }

        match expected {
            Value::Object(expected_map) => {
                let observed_map = self.object_operand(path, observed)?;
                self.compare_object(path, &observed_map, expected_map, depth)
            }
            Value::Array(expected_items) => match observed {
                Value::Array(observed_items) => {
                    self.compare_array(path, observed_items, expected_items, depth)
                }
                other => Err(Violation::new(
                    ViolationKind::SchemaMismatch,
                    path.clone(),
                    format!("target is array, item is {}: {}", Shape::of(other), render(other)),
                )),
            },
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.compare_scalar(path, observed, expected)
            }
        }
    }

    /// Every expected key must exist in `observed` and match.
    fn compare_object(
        &self,
        path: &Path,
        observed: &Map<String, Value>,
        expected: &Map<String, Value>,
        depth: usize,
    ) -> Outcome {
        let depth = self.enter(path, depth)?;

        for (key, expected_value) in expected {
            let child = path.key(key);
            let Some(observed_value) = observed.get(key) else {
                return Err(Violation::new(
                    ViolationKind::MissingKey,
                    child,
                    "missing key on item",
                ));
            };

            match expected_value {
                Value::String(encoded) => {
                    self.compare_string_target(&child, observed_value, encoded, depth)?
                }
                Value::Object(_) | Value::Array(_) => {
                    self.dispatch(&child, observed_value, expected_value, depth)?
                }
                Value::Null | Value::Bool(_) | Value::Number(_) => {
                    self.compare_scalar(&child, observed_value, expected_value)?
                }
            }
        }

        Ok(())
    }

    /// Positional comparison; lengths must agree.
    fn compare_array(
        &self,
        path: &Path,
        observed: &[Value],
        expected: &[Value],
        depth: usize,
    ) -> Outcome {
        let depth = self.enter(path, depth)?;

        if observed.len() != expected.len() {
            return Err(Violation::new(
                ViolationKind::SizeMismatch,
                path.clone(),
                format!(
                    "array size mismatch: target={} item={}",
                    expected.len(),
                    observed.len()
                ),
            ));
        }

        for (index, (observed_item, expected_item)) in observed.iter().zip(expected).enumerate() {
            self.dispatch(&path.index(index), observed_item, expected_item, depth)?;
        }

        Ok(())
    }

    /// An expected string value held by an object key.
    ///
    /// - an identical observed string always matches
    /// - a string that parses as JSON is decoded and the decoded value is
    ///   compared through generic dispatch
    /// - a string shaped like a JSON object/array that fails to parse is
    ///   `MalformedJson`
    /// - anything else is a plain scalar
    fn compare_string_target(
        &self,
        path: &Path,
        observed: &Value,
        encoded: &str,
        depth: usize,
    ) -> Outcome {
        if let Value::String(literal) = observed {
            if literal == encoded {
                return Ok(());
            }
        }

        match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => self.dispatch(path, observed, &decoded, depth),
            Err(e) if looks_like_document(encoded) => Err(Violation::new(
                ViolationKind::MalformedJson,
                path.clone(),
                format!("target bad json: {}", e),
            )),
            Err(_) => self.compare_scalar(path, observed, &Value::String(encoded.to_string())),
        }
    }

    /// The observed value to use when the target is an object.
    fn object_operand<'v>(
        &self,
        path: &Path,
        observed: &'v Value,
    ) -> Result<Cow<'v, Map<String, Value>>, Violation> {
        match observed {
            Value::Object(map) => Ok(Cow::Borrowed(map)),
            Value::String(encoded) if looks_like_document(encoded) => {
                match decode_document(path, encoded)? {
                    Value::Object(map) => Ok(Cow::Owned(map)),
                    other => Err(Violation::new(
                        ViolationKind::SchemaMismatch,
                        path.clone(),
                        format!("target is object, item is {}: {}", Shape::of(&other), render(&other)),
                    )),
                }
            }
            other => Err(Violation::new(
                ViolationKind::SchemaMismatch,
                path.clone(),
                format!("target is object, item is {}: {}", Shape::of(other), render(other)),
            )),
        }
    }

    fn compare_scalar(&self, path: &Path, observed: &Value, expected: &Value) -> Outcome {
        let target = canonical_string(expected).map_err(|e| {
            Violation::new(
                ViolationKind::SchemaMismatch,
                path.clone(),
                format!("target value: {}", e),
            )
        })?;
        let item = canonical_string(observed).map_err(|e| {
            Violation::new(
                ViolationKind::SchemaMismatch,
                path.clone(),
                format!("item value: {}", e),
            )
        })?;

        if canonical_equivalent(&target, &item) {
            Ok(())
        } else {
            Err(Violation::new(
                ViolationKind::ValueMismatch,
                path.clone(),
                format!("value mismatch: targetValue={} itemValue={}", target, item),
            ))
        }
    }

    /// Account for one more level of container nesting.
    fn enter(&self, path: &Path, depth: usize) -> Result<usize, Violation> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(Violation::new(
                ViolationKind::DepthExceeded,
                path.clone(),
                format!("nesting exceeds maximum depth {}", self.options.max_depth),
            ));
        }
        Ok(depth)
    }
}

/// Decode an observed string offered as a JSON document.
fn decode_document(path: &Path, encoded: &str) -> Result<Value, Violation> {
    serde_json::from_str(encoded).map_err(|e| {
        Violation::new(
            ViolationKind::MalformedJson,
            path.clone(),
            format!("item bad json: {}", e),
        )
    })
}

/// Compare with default options.
pub fn compare(observed: &Value, expected: &Value) -> Verdict {
    Comparator::default().compare(observed, expected)
}
