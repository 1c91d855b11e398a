//! Filesystem-backed baseline store
//!
//! The baseline for resource `id` under locator `<container>/<prefix>` lives
//! at `<root>/<container>/<prefix>/<id>`.

#![allow(clippy::result_large_err)]

use crate::errors::{baseline_missing, invalid_document, io_error, Result};
use crate::fs::{atomic_write, checked_join, validate_segment};
use conform_core::baseline::{Baseline, BaselineLocator};
use conform_core::collaborators::BaselineStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FsBaselineStore {
    root: PathBuf,
}

impl FsBaselineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the baseline document for a resource.
    ///
    /// # Errors
    ///
    /// `InvalidLocator` when the container or key would escape the root.
    pub fn path_for(&self, locator: &BaselineLocator, resource_id: &str) -> Result<PathBuf> {
        validate_segment("baseline_path", locator.container())?;
        let key = locator.key_for(resource_id);
        checked_join("baseline_path", &self.root.join(locator.container()), &key)
    }

    /// Record `document` as the baseline of `resource_id`.
    ///
    /// The bytes must hold a JSON document; they are stored as given and
    /// replaced atomically.
    ///
    /// # Errors
    ///
    /// `Serialization` for invalid JSON, `InvalidLocator` for unsafe keys,
    /// `Io` when the write fails.
    pub fn record(
        &self,
        locator: &BaselineLocator,
        resource_id: &str,
        document: &[u8],
    ) -> Result<Baseline> {
        serde_json::from_slice::<serde_json::Value>(document)
            .map_err(|e| invalid_document("record_baseline", e).with_resource_id(resource_id))?;

        let path = self.path_for(locator, resource_id)?;
        atomic_write(&path, document)?;

        let baseline = Baseline::new(locator.key_for(resource_id), document.to_vec());
        tracing::debug!(
            container = locator.container(),
            key = %baseline.key,
            digest = %baseline.digest,
            "baseline recorded"
        );
        Ok(baseline)
    }
}

impl BaselineStore for FsBaselineStore {
    fn fetch(&self, locator: &BaselineLocator, resource_id: &str) -> Result<Baseline> {
        let path = self.path_for(locator, resource_id)?;
        let key = locator.key_for(resource_id);

        match fs::read(&path) {
            Ok(bytes) => Ok(Baseline::new(key, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(baseline_missing(locator.container(), &key))
            }
            Err(e) => Err(io_error("fetch_baseline", e).with_resource_id(resource_id)),
        }
    }
}
