use crate::ini::errors::IniError;
use std::fmt;

/// Name of a `[Section]`, without the brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionName(String);

impl SectionName {
    pub fn parse(input: &str) -> Result<Self, IniError> {
        let name = input.trim();
        let invalid = |message: &str| IniError::InvalidSectionName {
            input: input.to_string(),
            message: message.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("empty section name"));
        }
        if name.contains(['[', ']']) {
            return Err(invalid("brackets are added automatically"));
        }
        if name.contains(['\n', '\r']) {
            return Err(invalid("line breaks not allowed"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The literal header line, e.g. `[Constants]`.
    pub fn header(&self) -> String {
        format!("[{}]", self.0)
    }

    /// True if `line` is this section's header (surrounding whitespace ignored).
    pub fn is_header(&self, line: &str) -> bool {
        line.trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|inner| inner == self.0)
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Left-hand side of a `key = value` line, e.g. `$swapvar` or `condition`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyName(String);

impl KeyName {
    pub fn parse(input: &str) -> Result<Self, IniError> {
        let key = input.trim();
        let invalid = |message: &str| IniError::InvalidKey {
            input: input.to_string(),
            message: message.to_string(),
        };

        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if key.contains(['=', '\n', '\r']) {
            return Err(invalid("'=' and line breaks not allowed"));
        }
        if key.starts_with([';', '[']) {
            return Err(invalid("keys cannot start with ';' or '['"));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `line` assigns this key: the key, optional blanks, then `=`.
    ///
    /// `$swapvar_set = 0` does not match `$swapvar`.
    pub fn matches_line(&self, line: &str) -> bool {
        line.trim_start()
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniQuery {
    Section { name: SectionName },
    Key { section: SectionName, key: KeyName },
}

impl IniQuery {
    pub fn section(name: &str) -> Result<Self, IniError> {
        Ok(IniQuery::Section {
            name: SectionName::parse(name)?,
        })
    }

    pub fn key(section: &str, key: &str) -> Result<Self, IniError> {
        Ok(IniQuery::Key {
            section: SectionName::parse(section)?,
            key: KeyName::parse(key)?,
        })
    }

    pub fn section_name(&self) -> &SectionName {
        match self {
            IniQuery::Section { name } => name,
            IniQuery::Key { section, .. } => section,
        }
    }
}

/// True for any line opening a section; this is what ends the previous one.
pub fn is_any_header(line: &str) -> bool {
    line.trim_start().starts_with('[')
}

/// True for `;` comment lines.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(';')
}
