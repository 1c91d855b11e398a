//! Conform Store - filesystem collaborators for rule evaluation
//!
//! Provides:
//! - Baseline documents addressed by locator and resource id
//! - Configuration history records per resource
//! - A JSON-lines outbox standing in for reporting and notification services

pub mod baseline_store;
pub mod errors;
mod fs;
pub mod history;
pub mod outbox;

// Re-export key types
pub use baseline_store::FsBaselineStore;
pub use conform_core::baseline::{Baseline, BaselineLocator};
pub use errors::Result;
pub use history::FsConfigHistory;
pub use outbox::{FsOutbox, OutboxEntry};
