pub mod applicator;
pub mod loader;
pub mod resolver;
pub mod schema;

pub use applicator::{
    apply_to_files, inspect_file, is_patched, patch_contents, ApplicationError, ApplyOptions,
    FileInspection, FileReport, PatchError, PatchOutcome, PatchResult,
};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use resolver::{resolve, ResolveError, ResolvedRun};
pub use schema::{
    DetectionMode, OutfitConfiguration, PartialParameters, PatchPlan, ShaderPatch,
    ValidationError, ValidationIssue,
};
