use crate::ini::editor::IniEditor;
use crate::markers::{CONSTANTS_SECTION, KEYSWAP_SECTION, SWAPVAR_VARIABLE};
use serde::Serialize;
use std::fmt;

/// Headers a merged mod file must contain.
pub const REQUIRED_SECTIONS: [&str; 2] = [CONSTANTS_SECTION, KEYSWAP_SECTION];

/// Tokens a merged mod file must contain somewhere.
pub const REQUIRED_VARIABLES: [&str; 1] = [SWAPVAR_VARIABLE];

const TEXTURE_OVERRIDE_PREFIX: &str = "[TextureOverride";
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Optional per-part texture override sections (names without brackets).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextureOverrides {
    pub head: Option<String>,
    pub body: Option<String>,
    pub dress: Option<String>,
    pub extra: Option<String>,
}

impl TextureOverrides {
    pub fn scan(editor: &IniEditor) -> Self {
        Self {
            head: find_texture_override(editor, "Head]"),
            body: find_texture_override(editor, "Body]"),
            dress: find_texture_override(editor, "Dress]"),
            extra: find_texture_override(editor, "Extra]"),
        }
    }

    /// The sections that were found, in head/body/dress/extra order.
    pub fn found(&self) -> impl Iterator<Item = &str> {
        [&self.head, &self.body, &self.dress, &self.extra]
            .into_iter()
            .filter_map(|name| name.as_deref())
    }
}

fn find_texture_override(editor: &IniEditor, suffix: &str) -> Option<String> {
    editor.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with(TEXTURE_OVERRIDE_PREFIX) && line.ends_with(suffix) {
            Some(line[1..line.len() - 1].to_string())
        } else {
            None
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub texture_overrides: TextureOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingMarker {
    Variable {
        name: String,
    },
    Section {
        name: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for MissingMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingMarker::Variable { name } => {
                write!(f, "The INI does not contain a {} variable", name)
            }
            MissingMarker::Section { name, suggestion } => {
                write!(f, "The INI does not contain a [{}] section", name)?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (found [{}], wrong case or typo?)", suggestion)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingMarkers {
    pub missing: Vec<MissingMarker>,
}

impl fmt::Display for MissingMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.missing.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for MissingMarkers {}

/// Check that `contents` looks like a merged mod file and report which
/// optional texture override sections it has.
pub fn validate(contents: &str) -> Result<ValidationReport, MissingMarkers> {
    let editor = IniEditor::parse(contents);
    validate_editor(&editor)
}

pub fn validate_editor(editor: &IniEditor) -> Result<ValidationReport, MissingMarkers> {
    let mut missing = Vec::new();

    for variable in REQUIRED_VARIABLES {
        if !editor.content().contains(variable) {
            missing.push(MissingMarker::Variable {
                name: variable.to_string(),
            });
        }
    }

    let headers = editor.header_names();
    for section in REQUIRED_SECTIONS {
        if !headers.contains(&section) {
            missing.push(MissingMarker::Section {
                name: section.to_string(),
                suggestion: suggest(section, &headers),
            });
        }
    }

    if !missing.is_empty() {
        return Err(MissingMarkers { missing });
    }

    Ok(ValidationReport {
        texture_overrides: TextureOverrides::scan(editor),
    })
}

fn suggest(wanted: &str, headers: &[&str]) -> Option<String> {
    let wanted = wanted.to_lowercase();
    headers
        .iter()
        .map(|header| (header, strsim::jaro_winkler(&wanted, &header.to_lowercase())))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(header, _)| header.to_string())
}
