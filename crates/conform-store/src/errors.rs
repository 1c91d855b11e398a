//! Error handling for conform-store
//!
//! Wraps conform-core ExError with store-specific helpers

use conform_core::errors::{ConformError, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a missing baseline error
pub fn baseline_missing(container: &str, key: &str) -> ExError {
    ConformError::BaselineNotFound {
        container: container.to_string(),
        key: key.to_string(),
    }
    .into()
}

/// Create a missing history error
pub fn history_missing(resource_type: &str, resource_id: &str) -> ExError {
    ConformError::HistoryNotFound {
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
    }
    .into()
}

/// Create an error for a path segment that would escape the store root
pub fn invalid_segment(operation: &str, value: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidLocator)
        .with_op(operation.to_string())
        .with_message(format!("unsafe path segment in '{}'", value))
}

/// Create an invalid document error
pub fn invalid_document(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(format!("invalid JSON document: {}", err))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
