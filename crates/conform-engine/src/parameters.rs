//! Rule parameters
//!
//! Delivered as a JSON object of strings inside the event envelope:
//!
//! | key                  | effect                                            |
//! |----------------------|---------------------------------------------------|
//! | `Dump`               | `ConfigItem` turns on verbose diagnostics         |
//! | `ResourceTypes`      | comma-separated list of applicable resource types |
//! | `Bucket`             | baseline locator `<container>[/<prefix>]`         |
//! | `TopicArn`           | notification destination                          |
//! | `ForceNonCompliance` | present: report non-compliance without comparing  |

use std::collections::{BTreeMap, BTreeSet};

pub const PARAM_DUMP: &str = "Dump";
pub const PARAM_RESOURCE_TYPES: &str = "ResourceTypes";
pub const PARAM_BUCKET: &str = "Bucket";
pub const PARAM_TOPIC_ARN: &str = "TopicArn";
pub const PARAM_FORCE_NON_COMPLIANCE: &str = "ForceNonCompliance";

/// `Dump` value that enables verbose diagnostics
pub const DUMP_CONFIG_ITEM: &str = "ConfigItem";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleParameters {
    pub verbose: bool,
    /// Empty means every resource type applies
    pub resource_types: BTreeSet<String>,
    pub bucket: Option<String>,
    pub topic: Option<String>,
    pub force_non_compliance: bool,
}

impl RuleParameters {
    /// Parse the raw `ruleParameters` string.
    ///
    /// Absent, empty or malformed parameters yield the defaults; a malformed
    /// document is logged and otherwise ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<BTreeMap<String, String>>(raw) {
            Ok(map) => Self::from_map(&map),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed rule parameters");
                Self::default()
            }
        }
    }

    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        for (key, value) in map {
            tracing::debug!(key = %key, value = %value, "rule parameter");
        }

        let resource_types = map
            .get(PARAM_RESOURCE_TYPES)
            .map(|types| {
                types
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            verbose: map.get(PARAM_DUMP).map(String::as_str) == Some(DUMP_CONFIG_ITEM),
            resource_types,
            bucket: non_empty(map.get(PARAM_BUCKET)),
            topic: non_empty(map.get(PARAM_TOPIC_ARN)),
            force_non_compliance: map.contains_key(PARAM_FORCE_NON_COMPLIANCE),
        }
    }

    /// Whether the resource-type restriction admits `resource_type`.
    pub fn admits(&self, resource_type: &str) -> bool {
        self.resource_types.is_empty() || self.resource_types.contains(resource_type)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
