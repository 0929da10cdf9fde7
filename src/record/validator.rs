//! Record validation against a style schema.
//!
//! This is the single gate that keeps generated artifacts on the schema: every
//! record is checked for column coverage, hallucinated columns, required values
//! and enumerated values before it is accepted.

use super::model::Record;
use crate::error::{CaselyError, Result};
use crate::schema::{ColumnKind, StyleSchema};
use serde::Serialize;
use std::collections::BTreeSet;

/// One reason a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("column '{column}' is not part of the style schema")]
    ExtraColumn { column: String },

    #[error("required column '{column}' is empty")]
    RequiredFieldEmpty { column: String },

    #[error("value '{value}' is not allowed in column '{column}' (allowed: {})", .allowed.join(", "))]
    EnumValueNotAllowed {
        column: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl ValidationError {
    pub fn column(&self) -> &str {
        match self {
            Self::MissingColumn { column }
            | Self::ExtraColumn { column }
            | Self::RequiredFieldEmpty { column }
            | Self::EnumValueNotAllowed { column, .. } => column,
        }
    }

    /// Stable machine-readable kind, e.g. `missing_column`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingColumn { .. } => "missing_column",
            Self::ExtraColumn { .. } => "extra_column",
            Self::RequiredFieldEmpty { .. } => "required_field_empty",
            Self::EnumValueNotAllowed { .. } => "enum_value_not_allowed",
        }
    }
}

/// Validate `record` against `schema`.
///
/// Returns every problem found; an empty list means the record is accepted.
/// Errors come in schema column order, followed by extra columns in lexical
/// order, so the verdict for a given pair is always identical. The order of the
/// record's own columns is never checked.
pub fn validate_record(schema: &StyleSchema, record: &Record) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for spec in &schema.columns {
        let Some(value) = record.get(&spec.name) else {
            errors.push(ValidationError::MissingColumn {
                column: spec.name.clone(),
            });
            continue;
        };

        if value.is_empty() {
            if spec.required {
                errors.push(ValidationError::RequiredFieldEmpty {
                    column: spec.name.clone(),
                });
            }
            continue;
        }

        if spec.kind == ColumnKind::Enumerated && !spec.allowed_values.is_empty() {
            let candidate = if value.is_multiline() {
                value.joined("\n")
            } else {
                value.joined("").trim().to_owned()
            };
            if !spec.allowed_values.contains(&candidate) {
                errors.push(ValidationError::EnumValueNotAllowed {
                    column: spec.name.clone(),
                    value: candidate,
                    allowed: spec.allowed_values.iter().cloned().collect(),
                });
            }
        }
    }

    let known: BTreeSet<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    errors.extend(
        record
            .columns()
            .filter(|c| !known.contains(c))
            .map(|c| ValidationError::ExtraColumn {
                column: c.to_owned(),
            }),
    );

    errors
}

/// Accept or reject `record`; a rejection carries every reason.
pub fn check_record(schema: &StyleSchema, record: &Record) -> Result<()> {
    let errors = validate_record(schema, record);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CaselyError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;
    use crate::schema::{ColumnSpec, StyleMeta};

    fn schema() -> StyleSchema {
        StyleSchema::new(
            vec![
                ColumnSpec::text("ID", true),
                ColumnSpec::text("Title", true),
                ColumnSpec::text("Steps", true),
                ColumnSpec::text("Expected", true),
                ColumnSpec::enumerated("Priority", ["High", "Medium", "Low"], true),
                ColumnSpec::text("Notes", false),
            ],
            StyleMeta::default(),
        )
        .unwrap()
    }

    fn valid_record() -> Record {
        Record::new()
            .with("ID", "TC-001")
            .with("Title", "Login")
            .with("Steps", CellValue::from_lines(["1. Open page", "2. Submit"]))
            .with("Expected", "Dashboard is shown")
            .with("Priority", "High")
            .with("Notes", "")
    }

    #[test]
    fn test_valid_record_is_accepted() {
        assert!(validate_record(&schema(), &valid_record()).is_empty());
        assert!(check_record(&schema(), &valid_record()).is_ok());
    }

    #[test]
    fn test_enum_value_not_allowed() {
        let record = valid_record().with("Priority", "Critical");
        let errors = validate_record(&schema(), &record);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::EnumValueNotAllowed { column, value, .. }
                if column == "Priority" && value == "Critical"
        ));
    }

    #[test]
    fn test_missing_title_then_empty_title() {
        let mut record = valid_record();
        record.remove("Title");
        assert_eq!(
            validate_record(&schema(), &record),
            vec![ValidationError::MissingColumn {
                column: "Title".to_owned()
            }]
        );

        let record = record.with("Title", "");
        assert_eq!(
            validate_record(&schema(), &record),
            vec![ValidationError::RequiredFieldEmpty {
                column: "Title".to_owned()
            }]
        );
    }

    #[test]
    fn test_extra_columns_reported_after_schema_columns() {
        let record = valid_record()
            .with("Zeta", "x")
            .with("Alpha", "y")
            .with("Priority", "Urgent");
        let kinds: Vec<_> = validate_record(&schema(), &record)
            .iter()
            .map(|e| (e.kind(), e.column().to_owned()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("enum_value_not_allowed", "Priority".to_owned()),
                ("extra_column", "Alpha".to_owned()),
                ("extra_column", "Zeta".to_owned()),
            ]
        );
    }

    #[test]
    fn test_optional_empty_enum_and_unconstrained_enum() {
        let mut schema = schema();
        if let Some(col) = schema.columns.iter_mut().find(|c| c.name == "Priority") {
            col.required = false;
        }
        let record = valid_record().with("Priority", " ");
        assert!(validate_record(&schema, &record).is_empty());

        if let Some(col) = schema.columns.iter_mut().find(|c| c.name == "Priority") {
            col.allowed_values.clear();
        }
        let record = valid_record().with("Priority", "Anything");
        assert!(validate_record(&schema, &record).is_empty());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let record = Record::new().with("Bogus", "1").with("Priority", "Nope");
        let first = validate_record(&schema(), &record);
        for _ in 0..10 {
            assert_eq!(validate_record(&schema(), &record), first);
        }
    }
}
