//! Discovery of the mod INI files to patch.

use crate::safety::DirectoryGuard;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of the files this tool edits.
pub const CONFIG_EXTENSION: &str = "ini";

/// Loaders skip files whose name starts with this prefix.
pub const DISABLED_PREFIX: &str = "DISABLED";

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("No INI files found at: {}.", dir.display())]
    NoFiles { dir: PathBuf },

    #[error("failed to list {}: {source}", dir.display())]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Safety(#[from] crate::safety::SafetyError),
}

/// Returns true for `*.ini` names that are not disabled.
pub fn is_candidate(file_name: &str) -> bool {
    let is_ini = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CONFIG_EXTENSION));
    let disabled = file_name
        .get(..DISABLED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DISABLED_PREFIX));
    is_ini && !disabled
}

/// List the patchable INI files directly inside `dir`, sorted by name.
///
/// Fails with [`LocatorError::NoFiles`] when nothing qualifies.
pub fn list_config_files(dir: &Path) -> Result<Vec<PathBuf>, LocatorError> {
    let guard = DirectoryGuard::new(dir)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LocatorError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_candidate(name) {
            continue;
        }

        // Symlinks are followed by the guard; directories named *.ini are not files
        if !entry.path().is_file() {
            continue;
        }

        match guard.validate_path(entry.path()) {
            Ok(_) => files.push(entry.path().to_path_buf()),
            Err(err) => warn!(path = %entry.path().display(), "skipping: {err}"),
        }
    }

    files.sort();
    debug!(count = files.len(), dir = %dir.display(), "located config files");

    if files.is_empty() {
        return Err(LocatorError::NoFiles {
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}
