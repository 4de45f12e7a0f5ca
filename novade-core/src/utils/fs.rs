//! Filesystem Utilities.

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at `path`, creating it and its parents if needed.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(CoreError::Filesystem {
            message: "Path exists but is not a directory".to_string(),
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "Path exists but is not a directory"),
        });
    }
    fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to create directory".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}
