use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every section-level operation (insert lines, rewrite a key line, append a
/// section) compiles down to this single primitive. Intelligence lives in
/// locating the span, not in applying it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply_to() is called"]
pub struct Edit {
    /// File the span was computed against (used for error reporting)
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to put at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (used for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Before-text verification failed at {file}:{byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("Edit span [{byte_start}, {byte_end}) splits a UTF-8 character")]
    NotCharBoundary { byte_start: usize, byte_end: usize },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self::with_verification(
            file,
            byte_start,
            byte_end,
            new_text,
            EditVerification::from_text(&expected),
        )
    }

    /// Create an edit with explicit verification strategy.
    pub fn with_verification(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        verification: EditVerification,
    ) -> Self {
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: verification,
        }
    }

    /// Pure insertion at `offset`.
    pub fn insert(file: impl Into<PathBuf>, offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(file, offset, offset, new_text, "")
    }

    /// Validate the edit against `content` and return the current span text.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }

        if !content.is_char_boundary(self.byte_start) || !content.is_char_boundary(self.byte_end)
        {
            return Err(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            });
        }

        let current = &content[self.byte_start..self.byte_end];
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to an in-memory copy of the file contents.
    pub fn apply_to(&self, content: &str) -> Result<String, EditError> {
        let current = self.validate(content)?;

        let mut updated =
            String::with_capacity(content.len() + self.new_text.len() - current.len());
        updated.push_str(&content[..self.byte_start]);
        updated.push_str(&self.new_text);
        updated.push_str(&content[self.byte_end..]);
        Ok(updated)
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_edit_verification_exact_match() {
        let verify = EditVerification::ExactMatch("[KeySwap]".to_string());
        assert!(verify.matches("[KeySwap]"));
        assert!(!verify.matches("[KeySwap_Alt]"));
    }

    #[test]
    fn test_edit_verification_hash() {
        let text = "condition = $active == 1";
        let verify = EditVerification::Hash(xxh3_64(text.as_bytes()));
        assert!(verify.matches(text));
        assert!(!verify.matches("condition = $active == 0"));
    }

    #[test]
    fn test_edit_verification_from_text_large() {
        let text = ";".repeat(2000);
        assert!(matches!(
            EditVerification::from_text(&text),
            EditVerification::Hash(_)
        ));
        assert!(matches!(
            EditVerification::from_text("small"),
            EditVerification::ExactMatch(_)
        ));
    }

    #[test]
    fn test_edit_invalid_range() {
        let edit = Edit::new("mod.ini", 5, 20, "replacement", "");
        let result = edit.apply_to("hello world");
        assert!(matches!(result, Err(EditError::InvalidByteRange { .. })));
    }

    #[test]
    fn test_edit_inverted_range() {
        let edit = Edit::new("mod.ini", 10, 5, "replacement", "");
        let result = edit.apply_to("hello world");
        assert!(matches!(result, Err(EditError::InvalidByteRange { .. })));
    }

    #[test]
    fn test_edit_rejects_split_character() {
        let edit = Edit::insert("mod.ini", 1, "x");
        let result = edit.apply_to("é");
        assert!(matches!(result, Err(EditError::NotCharBoundary { .. })));
    }

    #[test]
    fn test_edit_before_text_mismatch() {
        let edit = Edit::new("mod.ini", 0, 5, "HELLO", "world");
        let result = edit.apply_to("hello world");
        assert!(matches!(result, Err(EditError::BeforeTextMismatch { .. })));
    }

    #[test]
    fn test_edit_replace_and_insert() {
        let content = "[Constants]\nglobal $active = 0\n";
        let replaced = Edit::new("mod.ini", 12, 30, "global $active = 1", "global $active = 0")
            .apply_to(content)
            .unwrap();
        assert_eq!(replaced, "[Constants]\nglobal $active = 1\n");

        let inserted = Edit::insert("mod.ini", 12, "global $x = 0\n")
            .apply_to(content)
            .unwrap();
        assert_eq!(inserted, "[Constants]\nglobal $x = 0\nglobal $active = 0\n");
    }

    #[test]
    fn test_atomic_write_integration() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("mod.ini");
        fs::write(&file_path, b"original content").unwrap();

        atomic_write(&file_path, b"modified content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "modified content");
        // No stray temp files left behind
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
