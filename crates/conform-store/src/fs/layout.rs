//! Mapping of store keys onto paths under a root directory.
//!
//! Keys are `/`-separated. Every segment must be a plain name: empty, `.`
//! and `..` segments, and segments holding a path separator, are rejected
//! so a key can never address anything outside the root.

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_segment, Result};
use std::path::{Path, PathBuf};

/// Reject a single segment that is not a plain file name.
pub fn validate_segment(operation: &str, segment: &str) -> Result<()> {
    let plain = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('\\')
        && !segment.contains('/')
        && !segment.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(invalid_segment(operation, segment))
    }
}

/// Join a `/`-separated key onto `root`, validating each segment.
pub fn checked_join(operation: &str, root: &Path, key: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        validate_segment(operation, segment).map_err(|_| invalid_segment(operation, key))?;
        path.push(segment);
    }
    Ok(path)
}
