pub mod baseline;
pub mod compare;
pub mod evaluate;
pub mod normalize;

use conform_core::value::{decode_bytes, Value};
use std::path::Path;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Read and decode a JSON document, naming the file on failure.
pub fn read_document(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let value = decode_bytes(&bytes).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(value)
}
