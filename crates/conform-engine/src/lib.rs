//! Conform Engine - rule evaluation orchestration
//!
//! Turns one configuration-change event into one compliance evaluation:
//! decode the envelope, decide applicability, fetch the baseline, run the
//! comparator, report the result and notify on non-compliance.

pub mod evaluate;
pub mod event;
pub mod parameters;

pub use evaluate::{evaluate, Collaborators, EvaluationOutcome, ItemSource};
pub use event::{ConfigEvent, ConfigurationItem, InvokingEvent};
pub use parameters::RuleParameters;
