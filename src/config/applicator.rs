//! Patch applicator - injects the underwater outfit feature into mod files
//!
//! This module provides the per-file pipeline that:
//! - Refuses files already carrying the generated blocks
//! - Validates required markers and reads the file's `[KeySwap]` bindings
//! - Generates and splices the `[Constants]` and `[Present]` blocks
//! - Backs the file up and writes the result atomically
//! - Reports each step that turned out to be a no-op

use crate::backup::{create_backup, BackupError};
use crate::config::schema::{PatchPlan, ShaderPatch};
use crate::edit::{atomic_write, EditError};
use crate::generator::generate;
use crate::ini::validator::validate_editor;
use crate::ini::{
    Constraints, IniEditor, IniError, IniOperation, IniPlan, IniQuery, KeySwapParameters,
    MissingMarkers, Positioning, ValidationReport,
};
use crate::markers::{
    CONDITION_KEY, CONSTANTS_SECTION, GENERATED_MARKER, KEYSWAP_ALT_SECTION, KEYSWAP_CONDITION,
    KEYSWAP_SECTION, PRESENT_SECTION, PROVENANCE_LINE, SHADER_FIX_LINE, SWAPVAR_VARIABLE,
};
use crate::safety::{DirectoryGuard, SafetyError};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Result of patching a single file
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchResult should be checked for success/failure"]
pub enum PatchResult {
    /// File was patched (or would be, in a dry run)
    Applied {
        file: PathBuf,
        /// `None` in a dry run
        backup: Option<PathBuf>,
        original: String,
        patched: String,
        /// Steps that found nothing to do
        notes: Vec<String>,
    },
    /// Generated blocks were already present; file untouched
    AlreadyApplied { file: PathBuf },
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchResult::Applied { file, .. } => write!(f, "Patched {}", file.display()),
            PatchResult::AlreadyApplied { file } => {
                write!(f, "Already patched: {}", file.display())
            }
        }
    }
}

/// Failure of the in-memory patch pipeline.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("{0}")]
    Invalid(#[from] MissingMarkers),

    #[error(transparent)]
    Ini(#[from] IniError),
}

/// Errors during patch application
#[derive(Debug)]
pub enum ApplicationError {
    /// File moved outside the mod directory or vanished
    Safety(SafetyError),
    /// File I/O error
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File is not UTF-8; rewriting it could corrupt text
    Encoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
    /// File contents could not be patched
    Patch { file: PathBuf, source: PatchError },
    /// Backup could not be created
    Backup(BackupError),
    /// Patched contents could not be written
    Write { file: PathBuf, source: EditError },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Safety(e) => write!(f, "unsafe path: {}", e),
            ApplicationError::Io { path, source } => {
                write!(f, "INI file not readable: {}: {}", path.display(), source)
            }
            ApplicationError::Encoding { path, source } => write!(
                f,
                "INI file is not UTF-8 encoded: {} (invalid byte at offset {}); re-save it as UTF-8",
                path.display(),
                source.valid_up_to()
            ),
            ApplicationError::Patch { file, source } => {
                write!(f, "cannot patch {}: {}", file.display(), source)
            }
            ApplicationError::Backup(e) => write!(f, "backup error: {}", e),
            ApplicationError::Write { file, source } => {
                write!(f, "failed to write {}: {}", file.display(), source)
            }
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Safety(e) => Some(e),
            ApplicationError::Io { source, .. } => Some(source),
            ApplicationError::Encoding { source, .. } => Some(source),
            ApplicationError::Patch { source, .. } => Some(source),
            ApplicationError::Backup(e) => Some(e),
            ApplicationError::Write { source, .. } => Some(source),
        }
    }
}

impl From<SafetyError> for ApplicationError {
    fn from(e: SafetyError) -> Self {
        ApplicationError::Safety(e)
    }
}

impl From<BackupError> for ApplicationError {
    fn from(e: BackupError) -> Self {
        ApplicationError::Backup(e)
    }
}

/// Outcome of [`patch_contents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    AlreadyApplied,
    Patched { text: String, notes: Vec<String> },
}

/// True if the file already carries a generated block.
pub fn is_patched(contents: &str) -> bool {
    contents
        .lines()
        .any(|line| line.trim() == GENERATED_MARKER)
}

/// Accumulates edits over one file's text.
struct Patcher {
    text: String,
    notes: Vec<String>,
}

impl Patcher {
    fn step(
        &mut self,
        query: IniQuery,
        operation: IniOperation,
        constraints: Constraints,
    ) -> Result<bool, IniError> {
        let plan = IniEditor::parse(&self.text).plan(&query, &operation, constraints)?;
        match plan {
            IniPlan::Edit(edit) => {
                self.text = edit.apply_to(&self.text)?;
                Ok(true)
            }
            IniPlan::NoOp(reason) => {
                debug!(%reason, "patch step skipped");
                self.notes.push(reason);
                Ok(false)
            }
        }
    }
}

/// Run the whole edit sequence over one file's text. Pure.
pub fn patch_contents(contents: &str, plan: &PatchPlan) -> Result<PatchOutcome, PatchError> {
    if is_patched(contents) {
        return Ok(PatchOutcome::AlreadyApplied);
    }

    let editor = IniEditor::parse(contents);
    let report = validate_editor(&editor)?;
    let keyswap = KeySwapParameters::extract(contents);
    let blocks = generate(&plan.outfits, &keyswap, plan.detection);

    let mut patcher = Patcher {
        text: contents.to_string(),
        notes: Vec::new(),
    };

    patcher.step(
        IniQuery::section(CONSTANTS_SECTION)?,
        IniOperation::InsertLines {
            lines: blocks.constants,
        },
        Constraints::none(),
    )?;

    patcher.step(
        IniQuery::section(PRESENT_SECTION)?,
        IniOperation::MergeSection {
            lines: blocks.present,
            positioning: Positioning::default_anchors(),
        },
        Constraints::none(),
    )?;

    if plan.outfits.underwater_only() {
        let values = plan
            .outfits
            .swap_values()
            .iter()
            .map(ToString::to_string)
            .collect();
        patcher.step(
            IniQuery::key(KEYSWAP_ALT_SECTION, SWAPVAR_VARIABLE)?,
            IniOperation::RemoveValues { values },
            Constraints::none(),
        )?;
    }

    apply_shader_patch(&mut patcher, plan.shader_patch, &report)?;

    patcher.step(
        IniQuery::section(KEYSWAP_SECTION)?,
        IniOperation::AppendLine {
            line: PROVENANCE_LINE.to_string(),
        },
        Constraints::skip_existing(),
    )?;

    patcher.step(
        IniQuery::key(KEYSWAP_SECTION, CONDITION_KEY)?,
        IniOperation::ReplaceLine {
            value: KEYSWAP_CONDITION.to_string(),
        },
        Constraints::none(),
    )?;

    Ok(PatchOutcome::Patched {
        text: patcher.text,
        notes: patcher.notes,
    })
}

fn apply_shader_patch(
    patcher: &mut Patcher,
    shader_patch: ShaderPatch,
    report: &ValidationReport,
) -> Result<(), IniError> {
    match shader_patch {
        ShaderPatch::Disabled => Ok(()),
        ShaderPatch::Enabled {
            modern_game_version: false,
        } => {
            patcher
                .notes
                .push("shader fix skipped: ORFix only applies to game version 4.0 or newer".into());
            Ok(())
        }
        ShaderPatch::Enabled {
            modern_game_version: true,
        } => {
            let sections: Vec<&str> = report.texture_overrides.found().collect();
            if sections.is_empty() {
                patcher
                    .notes
                    .push("shader fix skipped: no texture override sections found".into());
            }
            for section in sections {
                patcher.step(
                    IniQuery::section(section)?,
                    IniOperation::InsertLines {
                        lines: vec![SHADER_FIX_LINE.to_string()],
                    },
                    Constraints::skip_existing(),
                )?;
            }
            Ok(())
        }
    }
}

/// What `check` reports about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInspection {
    pub file: PathBuf,
    pub already_patched: bool,
    pub report: Option<ValidationReport>,
    pub missing: Option<MissingMarkers>,
    pub keyswap: KeySwapParameters,
}

impl FileInspection {
    pub fn is_valid(&self) -> bool {
        self.missing.is_none()
    }
}

/// Read and validate one file without modifying it.
pub fn inspect_file(path: &Path) -> Result<FileInspection, ApplicationError> {
    let contents = read(path)?;
    let editor = IniEditor::parse(&contents);
    let (report, missing) = match validate_editor(&editor) {
        Ok(report) => (Some(report), None),
        Err(missing) => (None, Some(missing)),
    };

    Ok(FileInspection {
        file: path.to_path_buf(),
        already_patched: is_patched(&contents),
        report,
        missing,
        keyswap: KeySwapParameters::extract(&contents),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Compute the result without creating backups or writing
    pub dry_run: bool,
}

/// One file and what happened to it.
pub type FileReport = (PathBuf, Result<PatchResult, ApplicationError>);

/// Patch every file, independently of the others.
pub fn apply_to_files(
    files: &[PathBuf],
    plan: &PatchPlan,
    guard: &DirectoryGuard,
    options: ApplyOptions,
) -> Vec<FileReport> {
    files
        .iter()
        .map(|file| (file.clone(), apply_to_file(file, plan, guard, options)))
        .collect()
}

fn apply_to_file(
    file: &Path,
    plan: &PatchPlan,
    guard: &DirectoryGuard,
    options: ApplyOptions,
) -> Result<PatchResult, ApplicationError> {
    let canonical = guard.revalidate(file)?;
    let original = read(file)?;

    let (patched, notes) =
        match patch_contents(&original, plan).map_err(|source| ApplicationError::Patch {
            file: file.to_path_buf(),
            source,
        })? {
            PatchOutcome::AlreadyApplied => {
                return Ok(PatchResult::AlreadyApplied {
                    file: file.to_path_buf(),
                })
            }
            PatchOutcome::Patched { text, notes } => (text, notes),
        };

    let backup = if options.dry_run {
        None
    } else {
        let backup = create_backup(file)?;
        atomic_write(&canonical, patched.as_bytes()).map_err(|source| {
            ApplicationError::Write {
                file: file.to_path_buf(),
                source,
            }
        })?;
        info!(file = %file.display(), "patched");
        Some(backup)
    };

    Ok(PatchResult::Applied {
        file: file.to_path_buf(),
        backup,
        original,
        patched,
        notes,
    })
}

fn read(path: &Path) -> Result<String, ApplicationError> {
    let bytes = fs::read(path).map_err(|source| ApplicationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| ApplicationError::Encoding {
        path: path.to_path_buf(),
        source: e.utf8_error(),
    })
}
