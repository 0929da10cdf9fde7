//! Records and cell values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of one cell: a single line or a sequence of soft-broken lines.
///
/// Equality compares the lines, so `Lines(vec!["a"])` equals `Line("a")`. Use
/// [`CellValue::new`] or [`CellValue::from_lines`] to get the canonical variant.
///
/// Lines are stored as given, but the text table form trims every line, so
/// leading indentation (e.g. nested step bullets) does not survive a write to
/// a text artifact. Mark nesting with the line content instead, e.g. `1.1.`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Line(String),
    Lines(Vec<String>),
}

impl CellValue {
    /// Build a cell from text, splitting on `\n` (a trailing `\r` is dropped).
    pub fn new(text: impl AsRef<str>) -> Self {
        Self::from_lines(text.as_ref().split('\n').map(|l| l.trim_end_matches('\r')))
    }

    /// Build a cell from lines, collapsing zero or one line into [`CellValue::Line`].
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        match lines.len() {
            0 => Self::Line(String::new()),
            1 => Self::Line(lines.pop().unwrap_or_default()),
            _ => Self::Lines(lines),
        }
    }

    pub fn empty() -> Self {
        Self::Line(String::new())
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Self::Line(line) => std::slice::from_ref(line),
            Self::Lines(lines) => lines,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.lines().len() > 1
    }

    /// True when every line is blank.
    pub fn is_empty(&self) -> bool {
        self.lines().iter().all(|l| l.trim().is_empty())
    }

    /// Lines joined with `separator`.
    pub fn joined(&self, separator: &str) -> String {
        self.lines().join(separator)
    }

    /// Longest line measured in characters.
    pub fn max_line_chars(&self) -> usize {
        self.lines()
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.lines() == other.lines()
    }
}

impl Eq for CellValue {}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined("\n"))
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<Vec<String>> for CellValue {
    fn from(lines: Vec<String>) -> Self {
        Self::from_lines(lines)
    }
}

/// One test case: cell values keyed by column name.
///
/// Column order is not stored; renderers take it from the style schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `headers` with `cells` positionally.
    pub fn from_row(headers: &[String], cells: &[CellValue]) -> Self {
        headers
            .iter()
            .cloned()
            .zip(cells.iter().cloned())
            .collect()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.cells.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.cells.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Column names in lexical order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
