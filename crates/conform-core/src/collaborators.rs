//! Interfaces to the services surrounding the comparator.
//!
//! The rule handler only talks to these traits. Filesystem implementations
//! live in `conform-store`; the in-memory ones here back tests and dry runs.

use crate::baseline::{Baseline, BaselineLocator};
use crate::compliance::{Evaluation, Notification};
use crate::errors::{ConformError, ExError, ExErrorKind, Result};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Source of baseline documents.
#[allow(clippy::result_large_err)]
pub trait BaselineStore: Send + Sync {
    /// Fetch the baseline recorded for `resource_id` under `locator`.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing is recorded, `Io` for storage failures.
    fn fetch(&self, locator: &BaselineLocator, resource_id: &str) -> Result<Baseline>;
}

/// Source of the latest configuration item when only a summary was delivered.
#[allow(clippy::result_large_err)]
pub trait ConfigHistory: Send + Sync {
    /// Latest recorded item, with field names as the history source spells them.
    ///
    /// # Errors
    ///
    /// `NotFound` when no history exists for the resource.
    fn latest(&self, resource_type: &str, resource_id: &str) -> Result<Value>;
}

/// Compliance-reporting sink.
#[allow(clippy::result_large_err)]
pub trait EvaluationReporter: Send + Sync {
    /// Submit one evaluation under the invocation's result token.
    ///
    /// # Errors
    ///
    /// `ExternalService` when the sink rejects the evaluation.
    fn put_evaluation(&self, result_token: &str, evaluation: &Evaluation) -> Result<()>;
}

/// Failure notification sink.
#[allow(clippy::result_large_err)]
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// `ExternalService` when the topic rejects the message.
    fn publish(&self, notification: &Notification) -> Result<()>;
}

/// Baselines held in memory, keyed by `(container, key)`.
#[derive(Debug, Default)]
pub struct InMemoryBaselineStore {
    documents: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bytes` as the baseline of `resource_id`.
    pub fn insert(&self, locator: &BaselineLocator, resource_id: &str, bytes: impl Into<Vec<u8>>) {
        let key = (locator.container().to_string(), locator.key_for(resource_id));
        lock(&self.documents).insert(key, bytes.into());
    }
}

impl BaselineStore for InMemoryBaselineStore {
    fn fetch(&self, locator: &BaselineLocator, resource_id: &str) -> Result<Baseline> {
        let key = locator.key_for(resource_id);
        let documents = lock(&self.documents);
        match documents.get(&(locator.container().to_string(), key.clone())) {
            Some(bytes) => Ok(Baseline::new(key, bytes.clone())),
            None => Err(ConformError::BaselineNotFound {
                container: locator.container().to_string(),
                key,
            }
            .into()),
        }
    }
}

/// History records held in memory, keyed by `(resource_type, resource_id)`.
#[derive(Debug, Default)]
pub struct InMemoryConfigHistory {
    items: Mutex<HashMap<(String, String), Value>>,
}

impl InMemoryConfigHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, resource_type: &str, resource_id: &str, item: Value) {
        lock(&self.items).insert((resource_type.to_string(), resource_id.to_string()), item);
    }
}

impl ConfigHistory for InMemoryConfigHistory {
    fn latest(&self, resource_type: &str, resource_id: &str) -> Result<Value> {
        lock(&self.items)
            .get(&(resource_type.to_string(), resource_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                ConformError::HistoryNotFound {
                    resource_type: resource_type.to_string(),
                    resource_id: resource_id.to_string(),
                }
                .into()
            })
    }
}

/// History that has nothing; used when no history source is configured.
pub struct NoopConfigHistory;

impl ConfigHistory for NoopConfigHistory {
    fn latest(&self, resource_type: &str, resource_id: &str) -> Result<Value> {
        Err(ExError::new(ExErrorKind::NotFound)
            .with_op("fetch_history")
            .with_resource_type(resource_type)
            .with_resource_id(resource_id)
            .with_message("No configuration history configured"))
    }
}

/// Keeps every evaluation and notification it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    evaluations: Mutex<Vec<(String, Evaluation)>>,
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluations with the result token they were submitted under.
    pub fn evaluations(&self) -> Vec<(String, Evaluation)> {
        lock(&self.evaluations).clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }
}

impl EvaluationReporter for RecordingSink {
    fn put_evaluation(&self, result_token: &str, evaluation: &Evaluation) -> Result<()> {
        lock(&self.evaluations).push((result_token.to_string(), evaluation.clone()));
        Ok(())
    }
}

impl Notifier for RecordingSink {
    fn publish(&self, notification: &Notification) -> Result<()> {
        lock(&self.notifications).push(notification.clone());
        Ok(())
    }
}

/// Sink that discards everything.
pub struct NoopSink;

impl EvaluationReporter for NoopSink {
    fn put_evaluation(&self, _: &str, _: &Evaluation) -> Result<()> {
        Ok(())
    }
}

impl Notifier for NoopSink {
    fn publish(&self, _: &Notification) -> Result<()> {
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
