//! Compliance status, evaluation record and failure notification.
//!
//! A [`Verdict`] only exists when the comparator ran. The rule handler
//! widens it into a [`ComplianceStatus`] that can also say the resource was
//! out of scope or that the baseline could not be obtained.

use crate::compare::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the annotation forwarded to compliance reporting.
pub const MAX_ANNOTATION_CHARS: usize = 255;

/// Message published when a non-compliance carries no annotation.
pub const EMPTY_ANNOTATION_MESSAGE: &str = "[empty annotation]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    /// Resource outside the rule's scope
    NotApplicable,
    /// Comparator could not run
    InsufficientData,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::NonCompliant => "NON_COMPLIANT",
            ComplianceStatus::NotApplicable => "NOT_APPLICABLE",
            ComplianceStatus::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Verdict> for ComplianceStatus {
    fn from(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Compliant => ComplianceStatus::Compliant,
            Verdict::NonCompliant(_) => ComplianceStatus::NonCompliant,
        }
    }
}

/// Truncate to at most [`MAX_ANNOTATION_CHARS`] characters.
///
/// Counts `char`s, so a multi-byte character is never split.
pub fn truncate_annotation(annotation: &str) -> &str {
    match annotation.char_indices().nth(MAX_ANNOTATION_CHARS) {
        Some((byte_offset, _)) => &annotation[..byte_offset],
        None => annotation,
    }
}

/// One evaluation result as submitted to compliance reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub resource_type: String,
    pub resource_id: String,
    pub compliance: ComplianceStatus,
    /// Already truncated; `None` when there is nothing to say
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub ordering_timestamp: DateTime<Utc>,
}

impl Evaluation {
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        compliance: ComplianceStatus,
        annotation: &str,
        ordering_timestamp: DateTime<Utc>,
    ) -> Self {
        let annotation = truncate_annotation(annotation);
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            compliance,
            annotation: (!annotation.is_empty()).then(|| annotation.to_string()),
            ordering_timestamp,
        }
    }
}

/// Failure notice fanned out to a messaging topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub topic: String,
    pub subject: String,
    pub message: String,
    pub rule_name: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl Notification {
    /// Build the notice for a non-compliant resource.
    pub fn non_compliance(
        topic: impl Into<String>,
        rule_name: &str,
        resource_type: &str,
        resource_id: &str,
        annotation: Option<&str>,
    ) -> Self {
        let message = match annotation {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => EMPTY_ANNOTATION_MESSAGE.to_string(),
        };
        Self {
            topic: topic.into(),
            subject: format!(
                "Non-compliance: {} {} {}",
                rule_name, resource_type, resource_id
            ),
            message,
            rule_name: rule_name.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
        }
    }
}
