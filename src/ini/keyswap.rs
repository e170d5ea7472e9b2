use crate::ini::editor::IniEditor;
use crate::ini::query::SectionName;
use crate::markers::{KEYSWAP_SECTION, SWAPVAR_VARIABLE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bindings read from the mod's own `[KeySwap]` section.
///
/// Only plain `key = value` lines are captured; lines with more than one
/// `=` (such as `condition = $active == 1`) are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeySwapParameters {
    entries: BTreeMap<String, String>,
}

impl KeySwapParameters {
    pub fn extract(content: &str) -> Self {
        let editor = IniEditor::parse(content);
        let mut entries = BTreeMap::new();

        let Ok(section) = SectionName::parse(KEYSWAP_SECTION) else {
            return Self { entries };
        };
        let Some(body) = editor.section_body(&section) else {
            return Self { entries };
        };

        for line in body {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let mut parts = line.split('=');
            if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Forward key; empty when absent.
    pub fn key(&self) -> &str {
        self.get("key").unwrap_or_default()
    }

    pub fn back(&self) -> &str {
        self.get("back").unwrap_or_default()
    }

    pub fn swap_type(&self) -> &str {
        self.get("type").unwrap_or_default()
    }

    /// The `$swapvar` value list, e.g. `0,1,2,3`.
    pub fn swap_values(&self) -> &str {
        self.get(SWAPVAR_VARIABLE).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
