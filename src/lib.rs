//! Underwater Patcher: automatic underwater outfit swap for merged mod INI files
//!
//! Takes INI files produced by a mod-merging tool (a `[Constants]` section,
//! a `[KeySwap]` section cycling `$swapvar`, a `[Present]` section) and
//! splices in the logic that swaps to a chosen outfit while the character
//! is underwater and restores the previous variant after a delay on land.
//!
//! # Architecture
//!
//! All file changes compile down to a single primitive: [`Edit`], a
//! verified byte-span replacement. The [`ini`] module locates spans by
//! scanning section headers and plans edits against them; the
//! [`config::applicator`] runs the fixed edit sequence for each file.
//!
//! # Safety
//!
//! - Every file is backed up to `<file>.bak` before it is rewritten
//! - Atomic file writes (tempfile + fsync + rename)
//! - Files must stay inside the chosen mod directory
//! - Files already carrying the generated blocks are left alone
//!
//! # Example
//!
//! ```no_run
//! use underwater_patcher::config::{patch_contents, DetectionMode, OutfitConfiguration};
//! use underwater_patcher::config::{PatchOutcome, PatchPlan, ShaderPatch};
//!
//! let plan = PatchPlan {
//!     outfits: OutfitConfiguration::new("VK_RIGHT", vec![3], None, None, false).unwrap(),
//!     detection: DetectionMode::Local,
//!     shader_patch: ShaderPatch::Disabled,
//! };
//! let contents = std::fs::read_to_string("merged.ini").unwrap();
//!
//! match patch_contents(&contents, &plan) {
//!     Ok(PatchOutcome::Patched { text, .. }) => println!("{text}"),
//!     Ok(PatchOutcome::AlreadyApplied) => println!("already patched"),
//!     Err(e) => eprintln!("cannot patch: {e}"),
//! }
//! ```

pub mod backup;
pub mod config;
pub mod edit;
pub mod generator;
pub mod ini;
pub mod locator;
pub mod markers;
pub mod prompt;
pub mod safety;

// Re-exports
pub use backup::{
    backup_path_for, create_backup, restore_all, restore_backup, BackupError, RestoreOutcome,
    RestoreReport,
};
pub use config::{
    apply_to_files, load_from_path, load_from_str, patch_contents, ApplicationError, ConfigError,
    PatchPlan, PatchResult,
};
pub use edit::{Edit, EditError, EditVerification};
pub use locator::{list_config_files, LocatorError};
pub use safety::{DirectoryGuard, SafetyError};
