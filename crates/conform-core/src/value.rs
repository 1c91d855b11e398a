//! Value model for decoded resource-state documents.
//!
//! Documents are plain [`serde_json::Value`] trees. Every dispatch point in the
//! comparator classifies a node through [`Shape`] and matches exhaustively, so
//! an unexpected shape can never fall through silently.

use crate::errors::{ExError, ExErrorKind};
pub use serde_json::{Map, Value};

/// The six variants a decoded JSON value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Shape {
    /// Classify a value.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Bool,
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }

    /// True for everything except arrays and objects.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Shape::Array | Shape::Object)
    }

    /// Lower-case name used in violation reasons.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Number => "number",
            Shape::String => "string",
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode JSON text into a value.
///
/// # Errors
///
/// `Serialization` when the text is not a single valid JSON document.
pub fn decode(text: &str) -> Result<Value, ExError> {
    serde_json::from_str(text).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("decode")
            .with_message(format!("invalid JSON: {}", e))
    })
}

/// Decode raw bytes (UTF-8 JSON) into a value.
///
/// # Errors
///
/// `Serialization` when the bytes are not valid UTF-8 JSON.
pub fn decode_bytes(bytes: &[u8]) -> Result<Value, ExError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("decode")
            .with_message(format!("invalid JSON: {}", e))
    })
}

/// True when a string is shaped like an encoded JSON object or array.
///
/// Only the leading character is inspected; the text may still fail to
/// parse.
pub fn looks_like_document(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Compact single-line rendering for diagnostics.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
