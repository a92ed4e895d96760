//! Enumeration of installed binaries in binary directories

use crate::error::IoError;
use std::path::{Path, PathBuf};

/// Files found across all binary directories
#[derive(Debug, Default)]
pub struct Listing {
    /// Regular files, directory by directory, sorted by name within each
    pub binaries: Vec<PathBuf>,
    /// Directories that could not be read
    pub errors: Vec<IoError>,
}

/// List the regular files of every directory, in the order given.
///
/// The same file name in two directories is listed twice. Unreadable
/// directories are reported and skipped.
pub fn list_binaries(dirs: &[PathBuf]) -> Listing {
    let mut listing = Listing::default();

    for dir in dirs {
        match list_dir(dir) {
            Ok(files) => listing.binaries.extend(files),
            Err(e) => {
                tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                listing.errors.push(e);
            }
        }
    }

    listing
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::from_io(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        // Follows symlinks so linked binaries are included
        .filter(|path| path.is_file())
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}
