//! JSON-lines outbox
//!
//! Stands in for the compliance-reporting and notification services: every
//! submitted evaluation and published notification is appended to one file,
//! one JSON object per line, in submission order.

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_document, io_error, Result};
use chrono::{DateTime, Utc};
use conform_core::collaborators::{EvaluationReporter, Notifier};
use conform_core::compliance::{Evaluation, Notification};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One line of the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboxEntry {
    Evaluation {
        recorded_at: DateTime<Utc>,
        result_token: String,
        evaluation: Evaluation,
    },
    Notification {
        recorded_at: DateTime<Utc>,
        notification: Notification,
    },
}

pub struct FsOutbox {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsOutbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries appended so far; an absent file is an empty outbox.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Serialization` for a corrupt line.
    pub fn entries(&self) -> Result<Vec<OutboxEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read_outbox", e)),
        };

        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| invalid_document("read_outbox", e)))
            .collect()
    }

    fn append(&self, op: &str, entry: &OutboxEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).map_err(|e| invalid_document(op, e))?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(op, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(op, e))?;
        file.write_all(line.as_bytes()).map_err(|e| io_error(op, e))
    }
}

impl EvaluationReporter for FsOutbox {
    fn put_evaluation(&self, result_token: &str, evaluation: &Evaluation) -> Result<()> {
        self.append(
            "put_evaluation",
            &OutboxEntry::Evaluation {
                recorded_at: Utc::now(),
                result_token: result_token.to_string(),
                evaluation: evaluation.clone(),
            },
        )
    }
}

impl Notifier for FsOutbox {
    fn publish(&self, notification: &Notification) -> Result<()> {
        self.append(
            "publish_notification",
            &OutboxEntry::Notification {
                recorded_at: Utc::now(),
                notification: notification.clone(),
            },
        )
    }
}
