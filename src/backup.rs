//! Sibling `.bak` copies taken before any file is rewritten.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Suffix appended to the original path to name its backup.
pub const BACKUP_SUFFIX: &str = ".bak";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("failed to back up {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore {} from {}: {source}", path.display(), backup.display())]
    Restore {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of [`restore_backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Original overwritten and backup removed
    Restored,
    /// No backup on disk; nothing was touched
    Missing,
}

/// `<path>.bak`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Byte-copy `path` to its backup path, replacing any previous backup.
pub fn create_backup(path: &Path) -> Result<PathBuf, BackupError> {
    let backup = backup_path_for(path);
    fs::copy(path, &backup).map_err(|source| BackupError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!(backup = %backup.display(), "created backup");
    Ok(backup)
}

/// Overwrite `path` with `backup`, then delete `backup`.
pub fn restore_backup(path: &Path, backup: &Path) -> Result<RestoreOutcome, BackupError> {
    if !backup.is_file() {
        return Ok(RestoreOutcome::Missing);
    }

    let wrap = |source| BackupError::Restore {
        path: path.to_path_buf(),
        backup: backup.to_path_buf(),
        source,
    };
    fs::copy(backup, path).map_err(wrap)?;
    fs::remove_file(backup).map_err(wrap)?;
    info!(path = %path.display(), "restored backup");
    Ok(RestoreOutcome::Restored)
}

/// Per-file result of [`restore_all`].
pub type RestoreReport = (PathBuf, PathBuf, Result<RestoreOutcome, BackupError>);

/// Restore every `(file, backup)` pair. A failure on one file does not stop
/// the rest.
pub fn restore_all<'a, I>(pairs: I) -> Vec<RestoreReport>
where
    I: IntoIterator<Item = (&'a Path, &'a Path)>,
{
    pairs
        .into_iter()
        .map(|(path, backup)| {
            let result = restore_backup(path, backup);
            (path.to_path_buf(), backup.to_path_buf(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path_for(Path::new("/mods/merged.ini")),
            PathBuf::from("/mods/merged.ini.bak")
        );
    }

    #[test]
    fn test_backup_mutate_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("merged.ini");
        let original = b"[Constants]\r\nglobal persist $swapvar = 0\r\n";
        fs::write(&file, original).unwrap();

        let backup = create_backup(&file).unwrap();
        assert_eq!(fs::read(&backup).unwrap(), original);

        fs::write(&file, b"[Constants]\nchanged\n").unwrap();
        assert_eq!(
            restore_backup(&file, &backup).unwrap(),
            RestoreOutcome::Restored
        );

        assert_eq!(fs::read(&file).unwrap(), original);
        assert!(!backup.exists());
    }

    #[test]
    fn test_restore_missing_backup_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("merged.ini");
        fs::write(&file, b"unchanged").unwrap();

        let outcome = restore_backup(&file, &backup_path_for(&file)).unwrap();
        assert_eq!(outcome, RestoreOutcome::Missing);
        assert_eq!(fs::read(&file).unwrap(), b"unchanged");
    }

    #[test]
    fn test_restore_all_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();

        // A directory in place of the file makes the copy fail
        let blocked = dir.path().join("blocked.ini");
        fs::write(&blocked, b"original").unwrap();
        let blocked_backup = create_backup(&blocked).unwrap();
        fs::remove_file(&blocked).unwrap();
        fs::create_dir(&blocked).unwrap();

        let file = dir.path().join("merged.ini");
        fs::write(&file, b"original").unwrap();
        let backup = create_backup(&file).unwrap();
        fs::write(&file, b"patched").unwrap();

        let reports = restore_all([
            (blocked.as_path(), blocked_backup.as_path()),
            (file.as_path(), backup.as_path()),
        ]);

        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].2, Err(BackupError::Restore { .. })));
        assert!(blocked_backup.exists());
        assert!(matches!(reports[1].2, Ok(RestoreOutcome::Restored)));
        assert_eq!(fs::read(&file).unwrap(), b"original");
        assert!(!backup.exists());
    }

    #[test]
    fn test_create_backup_of_vanished_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_backup(&dir.path().join("gone.ini"));
        assert!(matches!(result, Err(BackupError::Create { .. })));
    }
}
