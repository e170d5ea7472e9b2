use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keeps every read and write inside the mod directory being patched.
///
/// Merged mod folders are frequently assembled from symlinks; a link that
/// resolves outside the folder must never be backed up or rewritten.
#[derive(Debug, Clone)]
pub struct DirectoryGuard {
    /// Canonical path to the mod directory
    root: PathBuf,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside the mod directory: {path} (directory: {root})")]
    OutsideDirectory { path: PathBuf, root: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl DirectoryGuard {
    /// Create a new guard for `root`.
    ///
    /// The root is canonicalized so symlinked directories compare correctly.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    /// Check if a path is safe to touch.
    ///
    /// Relative paths are resolved against the root. Returns the
    /// canonicalized absolute path if safe.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        self.revalidate(&absolute)
    }

    /// Re-validate a previously-validated path.
    ///
    /// Call this immediately before a write: the path is re-canonicalized
    /// and re-checked, so a link swapped in after listing is still caught.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize()?;
        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideDirectory {
                path: canonical,
                root: self.root.clone(),
            });
        }
        Ok(canonical)
    }

    /// Get the canonical root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
