pub mod editor;
pub mod errors;
pub mod keyswap;
pub mod operations;
pub mod query;
pub mod validator;

pub use editor::{
    append_line, ensure_section, insert_into_section, remove_list_values,
    remove_values_from_line, replace_value_line, IniEditor, IniPlan, SectionSpan,
};
pub use errors::IniError;
pub use keyswap::KeySwapParameters;
pub use operations::{Constraints, IniOperation, Positioning};
pub use query::{IniQuery, KeyName, SectionName};
pub use validator::{validate, MissingMarker, MissingMarkers, TextureOverrides, ValidationReport};
