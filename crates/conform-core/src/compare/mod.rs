//! Structural comparison of an observed document against its baseline.
//!
//! ## Entry point
//!
//! ```
//! use conform_core::compare::{compare, Verdict};
//! use serde_json::json;
//!
//! let item = json!({"tags": {"key1": "value1", "extra": true}});
//! let target = json!({"tags": {"key1": "value1"}});
//! assert_eq!(compare(&item, &target), Verdict::Compliant);
//! ```
//!
//! ## Guarantees
//!
//! - **Asymmetry**: the target is the schema authority; extra keys on the item
//!   are never inspected.
//! - **Single violation**: the walk stops at the first violation found. When
//!   several exist, which one is reported is not part of the contract.
//! - **Purity**: no I/O, no shared state; verbose tracing never changes the
//!   verdict.

pub mod engine;
pub mod model;

pub use engine::{compare, Comparator};
pub use model::{
    CompareOptions, Path, Segment, Verdict, Violation, ViolationKind, DEFAULT_MAX_DEPTH,
};
