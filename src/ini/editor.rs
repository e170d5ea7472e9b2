use crate::edit::{Edit, EditVerification};
use crate::ini::errors::IniError;
use crate::ini::operations::{Constraints, IniOperation, Positioning};
use crate::ini::query::{is_any_header, is_comment, IniQuery, KeyName, SectionName};
use std::collections::HashSet;
use std::ops::Range;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniPlan {
    Edit(Edit),
    NoOp(String),
}

impl IniPlan {
    /// Apply the plan to the text it was planned against.
    pub fn apply(&self, content: &str) -> Result<String, IniError> {
        match self {
            IniPlan::Edit(edit) => Ok(edit.apply_to(content)?),
            IniPlan::NoOp(reason) => {
                debug!(%reason, "ini edit skipped");
                Ok(content.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LineInfo {
    start: usize,
    /// End of the text, before `\r\n` / `\n`
    text_end: usize,
}

/// A section located by scanning: its header line and the first line
/// past its body (next header or end of file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub header: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn body(&self) -> Range<usize> {
        self.header + 1..self.end
    }
}

/// Line-oriented view of one INI file that plans section-scoped edits.
///
/// Lines are opaque text; only headers (`[...]`), comments (`;...`) and
/// `key = value` assignments are recognised.
pub struct IniEditor {
    file: PathBuf,
    content: String,
    lines: Vec<LineInfo>,
    newline: &'static str,
}

impl IniEditor {
    pub fn parse(content: &str) -> Self {
        Self::from_path("<ini-buffer>", content)
    }

    pub fn from_path(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            file: path.into(),
            content: content.to_string(),
            lines: scan_lines(content),
            newline: detect_newline(content),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Text of line `index` without its terminator.
    pub fn line(&self, index: usize) -> &str {
        let info = self.lines[index];
        &self.content[info.start..info.text_end]
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.lines.len()).map(move |index| self.line(index))
    }

    /// First section with this header. Later duplicates are ignored.
    pub fn find_section(&self, name: &SectionName) -> Option<SectionSpan> {
        let header = (0..self.lines.len()).find(|&i| name.is_header(self.line(i)))?;
        let end = (header + 1..self.lines.len())
            .find(|&i| is_any_header(self.line(i)))
            .unwrap_or(self.lines.len());
        Some(SectionSpan { header, end })
    }

    /// Body lines of the first section named `name`.
    pub fn section_body(&self, name: &SectionName) -> Option<Vec<&str>> {
        let span = self.find_section(name)?;
        Some(span.body().map(|i| self.line(i)).collect())
    }

    pub fn section_exists(&self, name: &str) -> bool {
        SectionName::parse(name).is_ok_and(|name| self.find_section(&name).is_some())
    }

    /// Names of every header in file order, brackets stripped.
    pub fn header_names(&self) -> Vec<&str> {
        self.lines()
            .filter_map(|line| {
                line.trim()
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
            })
            .collect()
    }

    pub fn plan(
        &self,
        query: &IniQuery,
        operation: &IniOperation,
        constraints: Constraints,
    ) -> Result<IniPlan, IniError> {
        match operation {
            IniOperation::InsertLines { lines } => self.plan_insert_lines(query, lines, constraints),
            IniOperation::MergeSection { lines, positioning } => {
                self.plan_merge_section(query, lines, positioning)
            }
            IniOperation::RemoveValues { values } => {
                self.plan_remove_values(query, values, constraints)
            }
            IniOperation::ReplaceLine { value } => {
                self.plan_replace_line(query, value, constraints)
            }
            IniOperation::AppendLine { line } => Ok(self.plan_append_line(line, constraints)),
        }
    }

    fn plan_insert_lines(
        &self,
        query: &IniQuery,
        lines: &[String],
        constraints: Constraints,
    ) -> Result<IniPlan, IniError> {
        let section = query.section_name();
        let Some(span) = self.find_section(section) else {
            return section_missing(section, constraints);
        };

        let lines: Vec<String> = if constraints.skip_existing {
            let existing: HashSet<&str> = span.body().map(|i| self.line(i).trim()).collect();
            lines
                .iter()
                .filter(|line| !existing.contains(line.trim()))
                .cloned()
                .collect()
        } else {
            lines.to_vec()
        };

        if lines.is_empty() {
            return Ok(IniPlan::NoOp(format!(
                "nothing new to insert into [{}]",
                section
            )));
        }

        let at_line = span
            .body()
            .find(|&i| is_comment(self.line(i)))
            .unwrap_or(span.end);
        Ok(IniPlan::Edit(self.insert_at_line(at_line, &lines)))
    }

    fn plan_merge_section(
        &self,
        query: &IniQuery,
        lines: &[String],
        positioning: &Positioning,
    ) -> Result<IniPlan, IniError> {
        let section = query.section_name();

        if let Some(span) = self.find_section(section) {
            // After the leading run of non-blank lines
            let at_line = span
                .body()
                .find(|&i| self.line(i).trim().is_empty())
                .unwrap_or(span.end);
            return Ok(IniPlan::Edit(self.insert_at_line(at_line, lines)));
        }

        let mut block = Vec::with_capacity(lines.len() + 1);
        block.push(section.header());
        block.extend(lines.iter().cloned());

        let Positioning::BeforeComment(prefixes) = positioning;
        let anchor = prefixes.iter().find_map(|prefix| {
            (0..self.lines.len()).find(|&i| self.line(i).trim_start().starts_with(prefix.as_str()))
        });

        if let Some(at_line) = anchor {
            debug!(section = %section, line = at_line, "creating section before anchor");
            return Ok(IniPlan::Edit(self.insert_at_line(at_line, &block)));
        }

        let separator = if self.content.is_empty() {
            String::new()
        } else if self.content.ends_with('\n') {
            self.newline.to_string()
        } else {
            self.newline.repeat(2)
        };
        let text = separator + &self.render(&block);
        Ok(IniPlan::Edit(Edit::insert(
            self.file.clone(),
            self.content.len(),
            text,
        )))
    }

    fn plan_remove_values(
        &self,
        query: &IniQuery,
        values: &[String],
        constraints: Constraints,
    ) -> Result<IniPlan, IniError> {
        let (section, key) = key_query(query, "remove_values")?;
        let index = match self.find_key_line(section, key, constraints)? {
            Ok(index) => index,
            Err(plan) => return Ok(plan),
        };

        let current = self.line(index);
        let list = current.split_once('=').map(|(_, rhs)| rhs).unwrap_or("");
        let original = split_list(list);
        let remaining = remove_list_values(list, values);
        if remaining.len() == original.len() {
            return Ok(IniPlan::NoOp(format!(
                "no listed values to remove from [{}] {}",
                section, key
            )));
        }
        if remaining.is_empty() {
            debug!(section = %section, key = %key, "every value removed from list");
        }

        let new_line = format!("{}{} = {}", indent_of(current), key, remaining.join(","));
        Ok(IniPlan::Edit(self.replace_line(index, new_line)))
    }

    fn plan_replace_line(
        &self,
        query: &IniQuery,
        value: &str,
        constraints: Constraints,
    ) -> Result<IniPlan, IniError> {
        let (section, key) = key_query(query, "replace_line")?;
        let index = match self.find_key_line(section, key, constraints)? {
            Ok(index) => index,
            Err(plan) => return Ok(plan),
        };

        let current = self.line(index);
        let new_line = format!("{}{} = {}", indent_of(current), key, value.trim());
        if current.trim_end() == new_line {
            return Ok(IniPlan::NoOp(format!(
                "value already matches: [{}] {}",
                section, key
            )));
        }

        Ok(IniPlan::Edit(self.replace_line(index, new_line)))
    }

    fn plan_append_line(&self, line: &str, constraints: Constraints) -> IniPlan {
        if constraints.skip_existing && self.lines().any(|existing| existing.trim() == line.trim()) {
            return IniPlan::NoOp("line already present".to_string());
        }

        let mut text = self.eof_prefix().to_string();
        text.push_str(line);
        text.push_str(self.newline);
        IniPlan::Edit(Edit::insert(self.file.clone(), self.content.len(), text))
    }

    /// Locate the first `key = ...` line inside the section.
    ///
    /// The inner `Err` carries the no-op plan for a missing section or key.
    fn find_key_line(
        &self,
        section: &SectionName,
        key: &KeyName,
        constraints: Constraints,
    ) -> Result<Result<usize, IniPlan>, IniError> {
        let Some(span) = self.find_section(section) else {
            return section_missing(section, constraints).map(Err);
        };

        match span.body().find(|&i| key.matches_line(self.line(i))) {
            Some(index) => Ok(Ok(index)),
            None if constraints.ensure_present => Err(IniError::KeyNotFound {
                section: section.to_string(),
                key: key.to_string(),
            }),
            None => Ok(Err(IniPlan::NoOp(format!(
                "key missing: [{}] {}",
                section, key
            )))),
        }
    }

    fn offset_of_line(&self, index: usize) -> usize {
        self.lines
            .get(index)
            .map_or(self.content.len(), |info| info.start)
    }

    /// Newline needed before text appended at EOF.
    fn eof_prefix(&self) -> &'static str {
        if self.content.is_empty() || self.content.ends_with('\n') {
            ""
        } else {
            self.newline
        }
    }

    fn render(&self, lines: &[String]) -> String {
        let mut text = String::new();
        for line in lines {
            text.push_str(line);
            text.push_str(self.newline);
        }
        text
    }

    fn insert_at_line(&self, index: usize, lines: &[String]) -> Edit {
        let offset = self.offset_of_line(index);
        let mut text = if offset == self.content.len() {
            self.eof_prefix().to_string()
        } else {
            String::new()
        };
        text.push_str(&self.render(lines));
        Edit::insert(self.file.clone(), offset, text)
    }

    fn replace_line(&self, index: usize, new_line: String) -> Edit {
        let info = self.lines[index];
        let current = &self.content[info.start..info.text_end];
        Edit::with_verification(
            self.file.clone(),
            info.start,
            info.text_end,
            new_line,
            EditVerification::from_text(current),
        )
    }
}

fn section_missing(section: &SectionName, constraints: Constraints) -> Result<IniPlan, IniError> {
    if constraints.ensure_present {
        return Err(IniError::SectionNotFound {
            section: section.to_string(),
        });
    }
    Ok(IniPlan::NoOp(format!("section missing: [{}]", section)))
}

fn key_query<'q>(
    query: &'q IniQuery,
    operation: &str,
) -> Result<(&'q SectionName, &'q KeyName), IniError> {
    match query {
        IniQuery::Key { section, key } => Ok((section, key)),
        IniQuery::Section { .. } => Err(IniError::InvalidOperation {
            message: format!("{operation} requires a key query"),
        }),
    }
}

fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Entries of a comma-separated list minus every entry in `values`,
/// keeping the order of the rest.
pub fn remove_list_values(list: &str, values: &[String]) -> Vec<String> {
    let remove: HashSet<&str> = values.iter().map(|v| v.trim()).collect();
    split_list(list)
        .into_iter()
        .filter(|entry| !remove.contains(entry))
        .map(str::to_string)
        .collect()
}

fn scan_lines(content: &str) -> Vec<LineInfo> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for line in content.split_inclusive('\n') {
        let text = line.strip_suffix('\n').unwrap_or(line);
        let text = text.strip_suffix('\r').unwrap_or(text);
        lines.push(LineInfo {
            start: offset,
            text_end: offset + text.len(),
        });
        offset += line.len();
    }

    lines
}

fn detect_newline(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn run(
    text: &str,
    query: IniQuery,
    operation: IniOperation,
    constraints: Constraints,
) -> Result<String, IniError> {
    IniEditor::parse(text)
        .plan(&query, &operation, constraints)?
        .apply(text)
}

/// Insert `new_lines` into the first `[section]`, right before its first
/// comment line or at its end. No-op if the section does not exist.
pub fn insert_into_section(
    text: &str,
    section: &str,
    new_lines: &[String],
) -> Result<String, IniError> {
    run(
        text,
        IniQuery::section(section)?,
        IniOperation::InsertLines {
            lines: new_lines.to_vec(),
        },
        Constraints::none(),
    )
}

/// Add `new_lines` to `[section]`, creating it in front of a known comment
/// heading (or at the end of the file) when it is missing.
pub fn ensure_section(text: &str, section: &str, new_lines: &[String]) -> Result<String, IniError> {
    run(
        text,
        IniQuery::section(section)?,
        IniOperation::MergeSection {
            lines: new_lines.to_vec(),
            positioning: Positioning::default_anchors(),
        },
        Constraints::none(),
    )
}

pub fn remove_values_from_line(
    text: &str,
    section: &str,
    variable: &str,
    values: &[String],
) -> Result<String, IniError> {
    run(
        text,
        IniQuery::key(section, variable)?,
        IniOperation::RemoveValues {
            values: values.to_vec(),
        },
        Constraints::none(),
    )
}

pub fn replace_value_line(
    text: &str,
    section: &str,
    variable: &str,
    new_value: &str,
) -> Result<String, IniError> {
    run(
        text,
        IniQuery::key(section, variable)?,
        IniOperation::ReplaceLine {
            value: new_value.to_string(),
        },
        Constraints::none(),
    )
}

pub fn append_line(text: &str, line: &str) -> Result<String, IniError> {
    let plan = IniEditor::parse(text).plan_append_line(line, Constraints::none());
    plan.apply(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const MERGED: &str = "\
; Constants ---
[Constants]
global persist $swapvar = 0
global $active
; trailing note

[KeySwap]
condition = $active == 1
key = VK_DOWN
type = cycle
$swapvar = 0,1,2,3

[Present]
post $active = 0

; Overrides ---
[TextureOverrideBody]
hash = abc
";

    #[test]
    fn insert_before_first_comment() {
        let out = insert_into_section(MERGED, "Constants", &lines(&["global $x = 1"])).unwrap();
        assert!(out.contains("global $active\nglobal $x = 1\n; trailing note\n"));
    }

    #[test]
    fn insert_at_section_end_without_comment() {
        let out = insert_into_section(MERGED, "KeySwap", &lines(&["back = VK_UP"])).unwrap();
        assert!(out.contains("$swapvar = 0,1,2,3\n\nback = VK_UP\n[Present]"));
    }

    #[test]
    fn insert_at_eof_without_trailing_newline() {
        let out = insert_into_section("[A]\nx = 1", "A", &lines(&["y = 2"])).unwrap();
        assert_eq!(out, "[A]\nx = 1\ny = 2\n");
    }

    #[test]
    fn insert_into_missing_section_is_noop() {
        let out = insert_into_section(MERGED, "Nope", &lines(&["x"])).unwrap();
        assert_eq!(out, MERGED);
    }

    #[test]
    fn ensure_present_turns_missing_into_error() {
        let editor = IniEditor::parse(MERGED);
        let query = IniQuery::section("Nope").unwrap();
        let op = IniOperation::InsertLines {
            lines: lines(&["x"]),
        };
        let constraints = Constraints {
            ensure_present: true,
            skip_existing: false,
        };
        let result = editor.plan(&query, &op, constraints);
        assert!(matches!(result, Err(IniError::SectionNotFound { .. })));
    }

    #[test]
    fn skip_existing_lines() {
        let editor = IniEditor::parse(MERGED);
        let query = IniQuery::section("TextureOverrideBody").unwrap();
        let op = IniOperation::InsertLines {
            lines: lines(&["hash = abc"]),
        };
        let plan = editor
            .plan(&query, &op, Constraints::skip_existing())
            .unwrap();
        assert!(matches!(plan, IniPlan::NoOp(_)));
    }

    #[test]
    fn only_first_duplicate_section_is_edited() {
        let text = "[A]\nx = 1\n[A]\nx = 2\n";
        let out = replace_value_line(text, "A", "x", "9").unwrap();
        assert_eq!(out, "[A]\nx = 9\n[A]\nx = 2\n");
    }

    #[test]
    fn crlf_is_preserved() {
        let text = "[Constants]\r\nglobal $a = 0\r\n\r\n[KeySwap]\r\n";
        let out = insert_into_section(text, "Constants", &lines(&["global $b = 1"])).unwrap();
        assert_eq!(
            out,
            "[Constants]\r\nglobal $a = 0\r\n\r\nglobal $b = 1\r\n[KeySwap]\r\n"
        );
    }

    #[test]
    fn merge_into_existing_section_after_leading_block() {
        let out = ensure_section(MERGED, "Present", &lines(&["if $x == 1", "endif"])).unwrap();
        assert!(out.contains("[Present]\npost $active = 0\nif $x == 1\nendif\n\n; Overrides ---"));
    }

    #[test]
    fn create_section_before_anchor() {
        let text = "[Constants]\n\n; Overrides ---\n[TextureOverrideBody]\n";
        let out = ensure_section(text, "Present", &lines(&["post $a = 0", ""])).unwrap();
        assert_eq!(
            out,
            "[Constants]\n\n[Present]\npost $a = 0\n\n; Overrides ---\n[TextureOverrideBody]\n"
        );
    }

    #[test]
    fn shader_anchor_preferred_over_overrides() {
        let text = "[Constants]\n; Overrides ---\n[A]\n; Shader ---\n[B]\n";
        let out = ensure_section(text, "Present", &lines(&["x"])).unwrap();
        assert!(out.contains("[A]\n[Present]\nx\n; Shader ---"));
    }

    #[test]
    fn create_section_at_end() {
        let out = ensure_section("[Constants]\nx = 1", "Present", &lines(&["y"])).unwrap();
        assert_eq!(out, "[Constants]\nx = 1\n\n[Present]\ny\n");
    }

    #[test]
    fn remove_values_keeps_order() {
        let out = remove_values_from_line(
            MERGED,
            "KeySwap",
            "$swapvar",
            &lines(&["1", "3", "7"]),
        )
        .unwrap();
        assert!(out.contains("$swapvar = 0,2\n"));
    }

    #[test]
    fn remove_values_without_match_is_noop() {
        let out = remove_values_from_line(MERGED, "KeySwap", "$swapvar", &lines(&["9"])).unwrap();
        assert_eq!(out, MERGED);
    }

    #[test]
    fn remove_values_is_scoped_to_section() {
        // $swapvar in [KeySwap] must not be touched when targeting [Present]
        let out = remove_values_from_line(MERGED, "Present", "$swapvar", &lines(&["1"])).unwrap();
        assert_eq!(out, MERGED);
    }

    #[test]
    fn remove_values_requires_key_query() {
        let editor = IniEditor::parse(MERGED);
        let op = IniOperation::RemoveValues { values: vec![] };
        let result = editor.plan(
            &IniQuery::section("KeySwap").unwrap(),
            &op,
            Constraints::none(),
        );
        assert!(matches!(result, Err(IniError::InvalidOperation { .. })));
    }

    #[test]
    fn replace_condition_line() {
        let out = replace_value_line(MERGED, "KeySwap", "condition", "$active == 1 && $x == 0")
            .unwrap();
        assert!(out.contains("[KeySwap]\ncondition = $active == 1 && $x == 0\nkey = VK_DOWN"));

        let again =
            replace_value_line(&out, "KeySwap", "condition", "$active == 1 && $x == 0").unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn append_line_terminates_previous_line() {
        assert_eq!(append_line("[A]", "; signed").unwrap(), "[A]\n; signed\n");
        assert_eq!(append_line("[A]\n", "; signed").unwrap(), "[A]\n; signed\n");
    }

    #[test]
    fn header_names_in_order() {
        let editor = IniEditor::parse(MERGED);
        assert_eq!(
            editor.header_names(),
            vec!["Constants", "KeySwap", "Present", "TextureOverrideBody"]
        );
        assert!(editor.section_exists("Present"));
        assert!(!editor.section_exists("KeySwap_Alt"));
    }
}
