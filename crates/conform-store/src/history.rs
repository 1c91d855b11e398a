//! Filesystem-backed configuration history
//!
//! The latest configuration item of a resource is a JSON document at
//! `<root>/<resourceType>/<resourceId>.json`, with field names spelled the
//! way the history source spells them (capitalized).

#![allow(clippy::result_large_err)]

use crate::errors::{history_missing, invalid_document, io_error, Result};
use crate::fs::{atomic_write, validate_segment};
use conform_core::collaborators::ConfigHistory;
use conform_core::value::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct FsConfigHistory {
    root: PathBuf,
}

impl FsConfigHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, resource_type: &str, resource_id: &str) -> Result<PathBuf> {
        validate_segment("history_path", resource_type)?;
        validate_segment("history_path", resource_id)?;
        Ok(self
            .root
            .join(resource_type)
            .join(format!("{}.json", resource_id)))
    }

    /// Store `item` as the latest record of a resource.
    ///
    /// # Errors
    ///
    /// `InvalidLocator` for unsafe names, `Io` when the write fails.
    pub fn record(&self, resource_type: &str, resource_id: &str, item: &Value) -> Result<()> {
        let path = self.path_for(resource_type, resource_id)?;
        let bytes = serde_json::to_vec_pretty(item)
            .map_err(|e| invalid_document("record_history", e))?;
        atomic_write(&path, &bytes)
    }
}

impl ConfigHistory for FsConfigHistory {
    fn latest(&self, resource_type: &str, resource_id: &str) -> Result<Value> {
        let path = self.path_for(resource_type, resource_id)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(history_missing(resource_type, resource_id))
            }
            Err(e) => {
                return Err(io_error("fetch_history", e)
                    .with_resource_type(resource_type)
                    .with_resource_id(resource_id))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            invalid_document("fetch_history", e)
                .with_resource_type(resource_type)
                .with_resource_id(resource_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::errors::ExErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_record_then_latest() {
        let dir = TempDir::new().unwrap();
        let history = FsConfigHistory::new(dir.path());
        let item = json!({"ResourceId": "i-1", "Configuration": {"State": "running"}});

        history.record("AWS::EC2::Instance", "i-1", &item).unwrap();

        assert_eq!(history.latest("AWS::EC2::Instance", "i-1").unwrap(), item);
        assert!(dir
            .path()
            .join("AWS::EC2::Instance")
            .join("i-1.json")
            .is_file());
    }

    #[test]
    fn test_latest_missing() {
        let dir = TempDir::new().unwrap();
        let history = FsConfigHistory::new(dir.path());

        let err = history.latest("AWS::EC2::Instance", "i-2").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.resource_id(), Some("i-2"));
    }

    #[test]
    fn test_latest_corrupt_record() {
        let dir = TempDir::new().unwrap();
        let type_dir = dir.path().join("T");
        fs::create_dir_all(&type_dir).unwrap();
        fs::write(type_dir.join("id.json"), b"not json").unwrap();

        let err = FsConfigHistory::new(dir.path()).latest("T", "id").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
