//! Schema inference from example tables.
//!
//! The first example fixes the column order; every other example must repeat it
//! exactly. Column kinds are classified over all observed non-empty values with
//! precedence numeric > date > enumerated > text.

use super::model::{
    ColumnKind, ColumnSpec, ResultGrouping, StepNumbering, StyleMeta, StyleSchema,
};
use crate::record::CellValue;
use crate::table::ParsedTable;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use thiserror::Error;

/// Largest distinct-value count that still makes a column enumerated.
pub const DEFAULT_ENUM_THRESHOLD: usize = 8;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+([.,]\d+)?|[.,]\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

static NUMBERED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.").expect("numbered line pattern is valid"));

static STEPS_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)step|precondition|шаг|предуслов").expect("steps role pattern is valid")
});

static RESULT_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)expected|result|ожидаем|результат").expect("result role pattern is valid")
});

/// Examples do not share one structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaConflictError {
    #[error("at least one example table is required")]
    NoExamples,

    #[error(
        "example {example} has headers [{}], expected [{}]",
        .found.join(", "),
        .expected.join(", ")
    )]
    HeaderMismatch {
        /// 1-based position of the offending example.
        example: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Tunables for [`extract_schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Inclusive upper bound on distinct values for an enumerated column.
    pub enum_threshold: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            enum_threshold: DEFAULT_ENUM_THRESHOLD,
        }
    }
}

/// Infer one [`StyleSchema`] from one or more parsed examples.
///
/// The result does not depend on the order of rows within or across examples.
pub fn extract_schema(
    examples: &[ParsedTable],
    options: &ExtractOptions,
) -> Result<StyleSchema, SchemaConflictError> {
    let first = examples.first().ok_or(SchemaConflictError::NoExamples)?;
    let headers = &first.headers;

    for (index, example) in examples.iter().enumerate().skip(1) {
        if &example.headers != headers {
            return Err(SchemaConflictError::HeaderMismatch {
                example: index + 1,
                expected: headers.clone(),
                found: example.headers.clone(),
            });
        }
    }

    let columns: Vec<ColumnSpec> = headers
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let values: Vec<&CellValue> = examples
                .iter()
                .flat_map(|example| example.column_values(index))
                .collect();
            profile_column(name, &values, options)
        })
        .collect();

    let meta = derive_meta(examples, &columns);
    tracing::debug!(
        columns = columns.len(),
        examples = examples.len(),
        language = %meta.language,
        "Extracted style schema"
    );

    // Headers were unique and non-empty when parsed, so the invariants hold.
    Ok(StyleSchema {
        version: super::model::SCHEMA_VERSION.to_owned(),
        columns,
        meta,
    })
}

fn profile_column(name: &str, values: &[&CellValue], options: &ExtractOptions) -> ColumnSpec {
    let filled: Vec<&CellValue> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    let required = !values.is_empty() && filled.len() == values.len();

    if filled.is_empty() {
        return ColumnSpec::text(name, required);
    }

    if filled.iter().any(|v| v.is_multiline()) {
        return ColumnSpec::text(name, required);
    }
    let single_lines: Vec<&str> = filled
        .iter()
        .map(|v| v.lines().first().map_or("", |l| l.trim()))
        .collect();

    if single_lines.iter().all(|v| is_numeric(v)) {
        return ColumnSpec::of_kind(name, ColumnKind::Numeric, required);
    }
    if single_lines.iter().all(|v| is_date(v)) {
        return ColumnSpec::of_kind(name, ColumnKind::Date, required);
    }

    let distinct: BTreeSet<&str> = single_lines.iter().copied().collect();
    if distinct.len() <= options.enum_threshold && distinct.len() < single_lines.len() {
        return ColumnSpec::enumerated(name, distinct, required);
    }

    ColumnSpec::text(name, required)
}

fn is_numeric(value: &str) -> bool {
    NUMBER_RE.is_match(value)
}

fn is_date(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

fn derive_meta(examples: &[ParsedTable], columns: &[ColumnSpec]) -> StyleMeta {
    StyleMeta {
        step_numbering: step_numbering(&role_cells(examples, columns, &STEPS_ROLE_RE)),
        result_grouping: result_grouping(&role_cells(examples, columns, &RESULT_ROLE_RE)),
        language: detect_language(examples, columns),
    }
}

/// Every cell of the columns whose name matches `role`.
fn role_cells<'a>(
    examples: &'a [ParsedTable],
    columns: &[ColumnSpec],
    role: &Regex,
) -> Vec<&'a CellValue> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| role.is_match(&c.name))
        .flat_map(|(index, _)| examples.iter().flat_map(move |e| e.column_values(index)))
        .collect()
}

/// Numbered only when there is evidence and every step line carries `N.`.
fn step_numbering(cells: &[&CellValue]) -> StepNumbering {
    let mut lines = cells
        .iter()
        .flat_map(|c| c.lines())
        .filter(|l| !l.trim().is_empty())
        .peekable();

    if lines.peek().is_none() {
        return StepNumbering::Bulleted;
    }
    if lines.all(|l| NUMBERED_LINE_RE.is_match(l)) {
        StepNumbering::Numbered
    } else {
        StepNumbering::Bulleted
    }
}

fn result_grouping(cells: &[&CellValue]) -> ResultGrouping {
    if cells.iter().any(|c| c.is_multiline()) {
        ResultGrouping::Grouped
    } else {
        ResultGrouping::Single
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
    Latin,
    Cyrillic,
    Greek,
    Han,
    Kana,
    Hangul,
    Arabic,
    Hebrew,
}

fn script_of(c: char) -> Option<Script> {
    let script = match c {
        'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' => Script::Latin,
        '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}' => Script::Cyrillic,
        '\u{0370}'..='\u{03FF}' => Script::Greek,
        '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' => Script::Han,
        '\u{3040}'..='\u{30FF}' => Script::Kana,
        '\u{1100}'..='\u{11FF}' | '\u{AC00}'..='\u{D7AF}' => Script::Hangul,
        '\u{0600}'..='\u{06FF}' => Script::Arabic,
        '\u{0590}'..='\u{05FF}' => Script::Hebrew,
        _ => return None,
    };
    c.is_alphabetic().then_some(script)
}

/// Majority script over the letters of text-like columns.
fn detect_language(examples: &[ParsedTable], columns: &[ColumnSpec]) -> String {
    let mut counts: BTreeMap<Script, usize> = BTreeMap::new();

    for (index, column) in columns.iter().enumerate() {
        if matches!(column.kind, ColumnKind::Numeric | ColumnKind::Date) {
            continue;
        }
        for value in examples.iter().flat_map(|e| e.column_values(index)) {
            for c in value.lines().iter().flat_map(|l| l.chars()) {
                if let Some(script) = script_of(c) {
                    *counts.entry(script).or_default() += 1;
                }
            }
        }
    }

    let kana = counts.remove(&Script::Kana).unwrap_or(0);
    if kana > 0 {
        *counts.entry(Script::Han).or_default() += kana;
    }

    // Ties go to the script declared first.
    let winner = counts
        .iter()
        .max_by(|(sa, ca), (sb, cb)| ca.cmp(cb).then(sb.cmp(sa)))
        .map(|(script, _)| *script);

    match winner {
        None => "und",
        Some(Script::Latin) => "en",
        Some(Script::Cyrillic) => "ru",
        Some(Script::Greek) => "el",
        Some(Script::Han | Script::Kana) if kana > 0 => "ja",
        Some(Script::Han | Script::Kana) => "zh",
        Some(Script::Hangul) => "ko",
        Some(Script::Arabic) => "ar",
        Some(Script::Hebrew) => "he",
    }
    .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;
    use pretty_assertions::assert_eq;

    const EXAMPLE: &str = "\
| ID | Title | Steps | Expected | Priority |
|----|-------|-------|----------|----------|
| 1 | Login | 1. Open<br>2. Submit | Dashboard | High |
| 2 | Logout | 1. Click logout | Login page | Medium |
| 3 | Reset | 1. Open reset<br>2. Send | Mail sent<br>Link valid | Low |
| 4 | Search | 1. Type query | Results | High |
";

    fn extract(text: &str) -> StyleSchema {
        extract_schema(&[parse_table(text).unwrap()], &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_priority_becomes_enumerated() {
        let schema = extract(EXAMPLE);
        let priority = schema.column("Priority").unwrap();
        assert_eq!(priority.kind, ColumnKind::Enumerated);
        assert_eq!(
            priority.allowed_values.iter().map(String::as_str).collect::<Vec<_>>(),
            ["High", "Low", "Medium"]
        );
        assert!(priority.required);
    }

    #[test]
    fn test_kinds_and_order() {
        let schema = extract(EXAMPLE);
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names, ["ID", "Title", "Steps", "Expected", "Priority"]);
        assert_eq!(schema.column("ID").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(schema.column("Title").unwrap().kind, ColumnKind::Text);
        assert_eq!(schema.column("Steps").unwrap().kind, ColumnKind::Text);
    }

    #[test]
    fn test_meta() {
        let schema = extract(EXAMPLE);
        assert_eq!(schema.meta.step_numbering, StepNumbering::Numbered);
        assert_eq!(schema.meta.result_grouping, ResultGrouping::Grouped);
        assert_eq!(schema.meta.language, "en");
    }

    #[test]
    fn test_dates_and_optional_columns() {
        let text = "\
| Created | Notes | Шаги |
|---|---|---|
| 2024-01-05 | | - Открыть |
| 05.02.2024 | seen once | - Закрыть |
";
        let schema = extract(text);
        assert_eq!(schema.column("Created").unwrap().kind, ColumnKind::Date);
        assert!(!schema.column("Notes").unwrap().required);
        assert_eq!(schema.meta.step_numbering, StepNumbering::Bulleted);
        assert_eq!(schema.meta.language, "ru");
    }

    #[test]
    fn test_enum_threshold_is_inclusive() {
        let mut text = String::from("| Level |\n|---|\n");
        for value in ["a", "b", "c", "a"] {
            text.push_str(&format!("| {value} |\n"));
        }
        let table = parse_table(&text).unwrap();

        let at_limit = ExtractOptions { enum_threshold: 3 };
        let schema = extract_schema(std::slice::from_ref(&table), &at_limit).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Enumerated);

        let below = ExtractOptions { enum_threshold: 2 };
        let schema = extract_schema(&[table], &below).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Text);
    }

    #[test]
    fn test_distinct_values_without_repeats_stay_text() {
        let schema = extract("| Name |\n|---|\n| a |\n| b |\n");
        assert_eq!(schema.columns[0].kind, ColumnKind::Text);
    }

    #[test]
    fn test_header_mismatch_is_a_conflict() {
        let a = parse_table("| ID | Title |\n|---|---|\n| 1 | x |").unwrap();
        let b = parse_table("| Title | ID |\n|---|---|\n| x | 1 |").unwrap();
        let err = extract_schema(&[a, b], &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, SchemaConflictError::HeaderMismatch { example: 2, .. }));
        assert_eq!(
            extract_schema(&[], &ExtractOptions::default()),
            Err(SchemaConflictError::NoExamples)
        );
    }

    #[test]
    fn test_row_order_does_not_change_schema() {
        let mut reversed: Vec<&str> = EXAMPLE.lines().collect();
        reversed[2..].reverse();
        let reversed = reversed.join("\n");
        assert_eq!(extract(EXAMPLE), extract(&reversed));
    }
}
