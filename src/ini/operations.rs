use crate::markers::SECTION_ANCHORS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    /// Missing section or key is an error instead of a no-op
    pub ensure_present: bool,
    /// Lines (or an appended line) already present are not added again
    pub skip_existing: bool,
}

impl Constraints {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn skip_existing() -> Self {
        Self {
            ensure_present: false,
            skip_existing: true,
        }
    }
}

/// Where a section is created when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positioning {
    /// In front of the first line starting with one of these comment
    /// prefixes, tried in order; falls back to the end of the file
    BeforeComment(Vec<String>),
}

impl Positioning {
    /// The comment headings merged mod files use between their blocks.
    pub fn default_anchors() -> Self {
        Positioning::BeforeComment(SECTION_ANCHORS.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniOperation {
    /// Insert before the section's first comment line, or at its end
    InsertLines { lines: Vec<String> },
    /// Add after the section's leading block, creating the section if needed
    MergeSection {
        lines: Vec<String>,
        positioning: Positioning,
    },
    /// Drop entries from a comma-separated value list
    RemoveValues { values: Vec<String> },
    /// Rewrite the whole key line as `key = value`
    ReplaceLine { value: String },
    /// Append one line at the end of the file
    AppendLine { line: String },
}
