//! Baseline addressing and fetched baseline documents.

use crate::errors::{ConformError, Result};
use crate::value::{decode_bytes, Value};
use sha2::{Digest, Sha256};

/// Compound locator `<container>[/<prefix>]`.
///
/// The first `/` separates the container from the prefix; any further `/`
/// belong to the prefix. A baseline for resource `id` is stored under
/// `<prefix>/<id>`, or just `<id>` when there is no prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineLocator {
    container: String,
    prefix: Option<String>,
}

impl BaselineLocator {
    /// Parse a locator string.
    ///
    /// # Errors
    ///
    /// `InvalidLocator` when the container part is empty.
    pub fn parse(locator: &str) -> Result<Self> {
        let locator = locator.trim();
        let (container, prefix) = match locator.split_once('/') {
            Some((container, prefix)) => (container, prefix.trim_end_matches('/')),
            None => (locator, ""),
        };

        if container.is_empty() {
            return Err(ConformError::InvalidLocator {
                locator: locator.to_string(),
                reason: "container is empty".to_string(),
            }
            .into());
        }

        Ok(Self {
            container: container.to_string(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Object key for a resource's baseline.
    pub fn key_for(&self, resource_id: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, resource_id),
            None => resource_id.to_string(),
        }
    }
}

impl std::fmt::Display for BaselineLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}/{}", self.container, prefix),
            None => f.write_str(&self.container),
        }
    }
}

/// Raw baseline bytes as fetched, with their content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub key: String,
    pub bytes: Vec<u8>,
    /// Lower-case hex SHA-256 of `bytes`
    pub digest: String,
}

impl Baseline {
    pub fn new(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        let digest = content_digest(&bytes);
        Self {
            key: key.into(),
            bytes,
            digest,
        }
    }

    /// Decode the baseline document.
    ///
    /// # Errors
    ///
    /// `Serialization` when the bytes are not a JSON document.
    pub fn decode(&self) -> Result<Value> {
        decode_bytes(&self.bytes).map_err(|e| {
            e.with_op("decode_baseline")
                .with_resource_id(self.key.clone())
        })
    }
}

/// Hex-encoded SHA-256 digest.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
