//! Schema data structures.

use crate::error::{CaselyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Version written into every persisted schema.
pub const SCHEMA_VERSION: &str = "1";

/// Inferred data kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Numeric,
    Date,
    Enumerated,
}

impl ColumnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Enumerated => "enumerated",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of the style schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    /// Only meaningful for [`ColumnKind::Enumerated`]; empty means unconstrained.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_values: BTreeSet<String>,
    pub required: bool,
}

impl ColumnSpec {
    pub fn text(name: impl Into<String>, required: bool) -> Self {
        Self::of_kind(name, ColumnKind::Text, required)
    }

    pub fn of_kind(name: impl Into<String>, kind: ColumnKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            allowed_values: BTreeSet::new(),
            required,
        }
    }

    pub fn enumerated<I, S>(name: impl Into<String>, values: I, required: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: ColumnKind::Enumerated,
            allowed_values: values.into_iter().map(Into::into).collect(),
            required,
        }
    }
}

/// How steps and preconditions are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepNumbering {
    Numbered,
    #[default]
    Bulleted,
}

/// Whether one expected-result cell holds one outcome or several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultGrouping {
    #[default]
    Single,
    Grouped,
}

/// Stylistic metadata learned alongside the columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleMeta {
    #[serde(default)]
    pub step_numbering: StepNumbering,
    #[serde(default)]
    pub result_grouping: ResultGrouping,
    #[serde(default = "undetermined_language")]
    pub language: String,
}

fn undetermined_language() -> String {
    "und".to_owned()
}

impl Default for StyleMeta {
    fn default() -> Self {
        Self {
            step_numbering: StepNumbering::default(),
            result_grouping: ResultGrouping::default(),
            language: undetermined_language(),
        }
    }
}

/// Canonical column structure plus style metadata.
///
/// Column order is fixed at extraction and never changed implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSchema {
    pub version: String,
    pub columns: Vec<ColumnSpec>,
    pub meta: StyleMeta,
}

impl StyleSchema {
    /// Build a schema, enforcing the column invariants.
    pub fn new(columns: Vec<ColumnSpec>, meta: StyleMeta) -> Result<Self> {
        let schema = Self {
            version: SCHEMA_VERSION.to_owned(),
            columns,
            meta,
        };
        schema.check_integrity()?;
        Ok(schema)
    }

    /// Supported version, at least one column, unique non-empty names.
    pub fn check_integrity(&self) -> Result<()> {
        if self.version != SCHEMA_VERSION {
            return Err(CaselyError::InvalidSchema(format!(
                "unsupported schema version '{}', expected '{SCHEMA_VERSION}'",
                self.version
            )));
        }
        if self.columns.is_empty() {
            return Err(CaselyError::InvalidSchema(
                "schema has no columns".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(CaselyError::InvalidSchema(
                    "column name must not be empty".to_owned(),
                ));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CaselyError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parse and check a persisted schema.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.check_integrity()?;
        Ok(schema)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
