// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for stereogram record directories
//!
//! Each stereogram lives in its own directory under the store root. The
//! directory name is a random UUID so records never collide and their order
//! on disk carries no meaning.

use crate::errors::{ErrorCode, StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create the store root if needed
pub fn ensure_store_dir(root: &Path) -> StoreResult<()> {
    fs::create_dir_all(root).map_err(|e| {
        StoreError::new(
            ErrorCode::CouldntCreateSharedStore,
            format!("Could not create {}: {}", root.display(), e),
        )
    })?;
    debug!(path = %root.display(), "Store directory ready");
    Ok(())
}

/// Create a new, empty, uniquely named record directory under `parent`
pub fn new_record_dir(parent: &Path) -> StoreResult<PathBuf> {
    let dir = parent.join(uuid::Uuid::new_v4().to_string());
    fs::create_dir(&dir)?;
    debug!(path = %dir.display(), "Created record directory");
    Ok(dir)
}

/// List the subdirectories of `parent`, sorted by name
///
/// Plain files and hidden entries are ignored.
pub fn record_dirs(parent: &Path) -> StoreResult<Vec<PathBuf>> {
    if !parent.is_dir() {
        return Err(StoreError::new(
            ErrorCode::FileNotFound,
            format!("Not a directory: {}", parent.display()),
        ));
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(parent)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .map(|name| !name.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// Delete a record directory and everything in it
pub fn remove_record_dir(dir: &Path) -> StoreResult<()> {
    fs::remove_dir_all(dir)?;
    info!(path = %dir.display(), "Deleted record directory");
    Ok(())
}

/// Newest file in `dir` with one of the given extensions
///
/// Used to report the last export in the camera-roll directory.
pub fn latest_file_with_extensions(dir: &Path, extensions: &[&str]) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    entries
        .flatten()
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy();
                    extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted))
                })
                .unwrap_or(false)
        })
        .max_by_key(|entry| entry.metadata().ok().and_then(|m| m.modified().ok()))
        .map(|entry| entry.path())
}
