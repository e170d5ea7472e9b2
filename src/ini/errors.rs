use thiserror::Error;

#[derive(Error, Debug)]
pub enum IniError {
    #[error("invalid section name '{input}': {message}")]
    InvalidSectionName { input: String, message: String },

    #[error("invalid key '{input}': {message}")]
    InvalidKey { input: String, message: String },

    #[error("section not found: [{section}]")]
    SectionNotFound { section: String },

    #[error("key not found: [{section}] {key}")]
    KeyNotFound { section: String, key: String },

    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("edit error: {0}")]
    Edit(#[from] crate::edit::EditError),
}
