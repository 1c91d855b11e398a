//! Configuration-change event envelope.
//!
//! The envelope carries the invoking event and the rule parameters as JSON
//! encoded strings; both are decoded lazily from the raw fields.

#![allow(clippy::result_large_err)]

use crate::parameters::RuleParameters;
use chrono::{DateTime, Utc};
use conform_core::errors::{ConformError, Result};
use conform_core::value::{render, Map, Shape, Value};
use conform_core_types::Sensitive;
use serde::Deserialize;

pub const FIELD_CONFIGURATION_ITEM: &str = "configurationItem";
pub const FIELD_CONFIGURATION_ITEM_SUMMARY: &str = "configurationItemSummary";

/// Item statuses that are evaluated; anything else is not applicable.
pub const ACTIVE_STATUSES: [&str; 2] = ["OK", "ResourceDiscovered"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEvent {
    /// JSON-encoded invoking event
    pub invoking_event: String,
    /// JSON-encoded object of string parameters
    #[serde(default)]
    pub rule_parameters: Option<String>,
    #[serde(default)]
    pub result_token: Sensitive<String>,
    #[serde(default)]
    pub event_left_scope: bool,
    #[serde(default)]
    pub config_rule_name: String,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl ConfigEvent {
    /// Decode an envelope from JSON bytes.
    ///
    /// # Errors
    ///
    /// `InvalidEvent` when the bytes are not an envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            ConformError::InvalidEvent {
                reason: format!("envelope: {}", e),
            }
            .into()
        })
    }

    pub fn parameters(&self) -> RuleParameters {
        RuleParameters::parse(self.rule_parameters.as_deref())
    }

    /// # Errors
    ///
    /// See [`InvokingEvent::parse`].
    pub fn invoking(&self) -> Result<InvokingEvent> {
        InvokingEvent::parse(&self.invoking_event)
    }
}

/// What the invoking event delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokingEvent {
    /// The full configuration item
    Item(ConfigurationItem),
    /// Only identifiers; the item must be fetched from history
    Summary {
        resource_type: String,
        resource_id: String,
    },
}

impl InvokingEvent {
    /// Decode the invoking event text.
    ///
    /// A `configurationItem` wins over a `configurationItemSummary`; a `null`
    /// item counts as absent.
    ///
    /// # Errors
    ///
    /// - `InvalidEvent` for undecodable text or a non-object field
    /// - `MissingField` when neither field is present
    pub fn parse(text: &str) -> Result<Self> {
        let decoded: Value = serde_json::from_str(text).map_err(|e| ConformError::InvalidEvent {
            reason: format!("invokingEvent: {}", e),
        })?;
        let mut event = match decoded {
            Value::Object(map) => map,
            other => {
                return Err(ConformError::InvalidEvent {
                    reason: format!("invokingEvent is {}, not an object", Shape::of(&other)),
                }
                .into())
            }
        };

        match event.remove(FIELD_CONFIGURATION_ITEM) {
            Some(Value::Null) | None => {}
            Some(item) => return Ok(InvokingEvent::Item(ConfigurationItem::from_document(item)?)),
        }

        match event.remove(FIELD_CONFIGURATION_ITEM_SUMMARY) {
            Some(Value::Object(summary)) => Ok(InvokingEvent::Summary {
                resource_type: required_string(&summary, "resourceType")?,
                resource_id: required_string(&summary, "resourceId")?,
            }),
            Some(other) => Err(not_object(FIELD_CONFIGURATION_ITEM_SUMMARY, &other)),
            None => Err(ConformError::MissingConfigurationItem.into()),
        }
    }
}

/// A configuration item document with its identifying fields extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationItem {
    pub status: String,
    pub resource_type: String,
    pub resource_id: String,
    pub capture_time: Option<String>,
    /// The complete item; this is the observed side of the comparison
    pub document: Value,
}

impl ConfigurationItem {
    /// # Errors
    ///
    /// `InvalidEvent` when `document` is not an object.
    pub fn from_document(document: Value) -> Result<Self> {
        let Value::Object(fields) = &document else {
            return Err(not_object(FIELD_CONFIGURATION_ITEM, &document));
        };

        Ok(Self {
            status: string_field(fields, "configurationItemStatus").unwrap_or_default(),
            resource_type: string_field(fields, "resourceType").unwrap_or_default(),
            resource_id: string_field(fields, "resourceId").unwrap_or_default(),
            capture_time: string_field(fields, "configurationItemCaptureTime"),
            document,
        })
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.status.as_str())
    }

    /// Capture time as the evaluation's ordering timestamp.
    ///
    /// An absent or unparsable capture time is logged and replaced by the
    /// Unix epoch.
    pub fn ordering_timestamp(&self) -> DateTime<Utc> {
        let raw = self.capture_time.as_deref().unwrap_or_default();
        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!(
                    resource_id = %self.resource_id,
                    capture_time = raw,
                    error = %e,
                    "unparsable capture time, ordering by epoch"
                );
                DateTime::<Utc>::UNIX_EPOCH
            }
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn required_string(fields: &Map<String, Value>, key: &str) -> Result<String> {
    string_field(fields, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ConformError::InvalidEvent {
                reason: format!("{} lacks {}", FIELD_CONFIGURATION_ITEM_SUMMARY, key),
            }
            .into()
        })
}

fn not_object(field: &str, found: &Value) -> conform_core::ExError {
    ConformError::FieldNotObject {
        field: field.to_string(),
        found: render(found),
    }
    .into()
}
