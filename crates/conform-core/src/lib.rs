//! Conform Core - structural comparison of resource state against baselines
//!
//! This crate provides the comparison kernel and the types shared by the
//! rule handler:
//! - Value model over decoded JSON documents
//! - Key normalization for capitalized-field sources
//! - Scalar equivalence (numeric and timestamp cross-representation)
//! - Structural comparator producing a single-violation verdict
//! - Compliance status, evaluation and notification records
//! - Collaborator interfaces for baselines, history, reporting and notification
//! - Error and logging facilities

pub mod baseline;
pub mod collaborators;
pub mod compare;
pub mod compliance;
pub mod errors;
pub mod logging_facility;
pub mod normalize;
pub mod scalar;
pub mod value;

// Used by the logging macros.
pub use conform_core_types;

// Re-export commonly used types
pub use baseline::{Baseline, BaselineLocator};
pub use collaborators::{BaselineStore, ConfigHistory, EvaluationReporter, Notifier};
pub use compare::{compare, CompareOptions, Comparator, Path, Verdict, Violation, ViolationKind};
pub use compliance::{ComplianceStatus, Evaluation, Notification};
pub use errors::{ConformError, ExError, ExErrorKind, Result};
pub use normalize::normalize_keys;
pub use value::{Shape, Value};
