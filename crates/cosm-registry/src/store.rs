//! JSON persistence helpers.
//!
//! Every document cosm keeps on disk goes through these three functions, so
//! the formatting (two-space indentation, trailing newline) is uniform.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RegistryError, Result};

/// Read and parse a JSON document that must exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path).map_err(RegistryError::io(path))?;
    serde_json::from_str(&data).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON document, or return `T::default()` if the file is missing.
///
/// A file that exists but does not parse is still an error.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_json(path)
}

/// Serialize `value` with indentation and overwrite `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_string_pretty(value)?;
    data.push('\n');
    std::fs::write(path, data).map_err(RegistryError::io(path))
}
