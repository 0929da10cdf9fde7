//! Bringing test cases into a record store.
//!
//! - [`split_table`] turns one multi-row table into atomic artifacts.
//! - [`import_xlsx`] reads a spreadsheet artifact back into a text artifact.
//!
//! Both go through [`RecordStore::put`], so every record is validated before
//! it is written.

use crate::error::{CaselyError, Result};
use crate::record::{
    ArtifactName, Record, RecordStore, SHORT_DESCRIPTION_WORDS, sanitize_id, slugify,
};
use crate::render::read_xlsx;
use crate::report::BatchReport;
use crate::schema::StyleSchema;
use crate::table::ParsedTable;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

static ID_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(test\s*)?(case\s*)?(id|№|#|ид|идентификатор)$").expect("id role pattern is valid")
});

static TITLE_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)title|summary|name|название|заголовок|наименование")
        .expect("title role pattern is valid")
});

/// Column holding the test case id: an id-like name, else the first column.
fn id_column(schema: &StyleSchema) -> Option<&str> {
    schema
        .column_names()
        .find(|name| ID_ROLE_RE.is_match(name.trim()))
        .or_else(|| schema.column_names().next())
}

/// Column holding the title: a title-like name, else the second column.
fn title_column(schema: &StyleSchema) -> Option<&str> {
    schema
        .column_names()
        .find(|name| TITLE_ROLE_RE.is_match(name))
        .or_else(|| schema.column_names().nth(1))
}

/// `{kind}_{id}_{slug of title}` for `record`.
pub fn artifact_name_for(schema: &StyleSchema, record: &Record, kind: &str) -> Result<ArtifactName> {
    let text_of = |column: Option<&str>| {
        column
            .and_then(|c| record.get(c))
            .map(|v| v.joined(" "))
            .unwrap_or_default()
    };

    let id = sanitize_id(&text_of(id_column(schema)));
    let description = slugify(&text_of(title_column(schema)), SHORT_DESCRIPTION_WORDS);
    ArtifactName::new(kind, &id, &description)
}

/// Store every row of `table` as its own artifact.
///
/// Rows that fail validation or collide with an existing artifact are reported
/// and skipped; the remaining rows are still stored.
pub fn split_table(
    table: &ParsedTable,
    kind: &str,
    schema: &StyleSchema,
    store: &RecordStore,
) -> Result<BatchReport> {
    // Reject a bad kind once instead of once per row.
    ArtifactName::new(kind, "id", "check")?;

    let start = Instant::now();
    let mut report = BatchReport::default();

    for (index, record) in table.records().enumerate() {
        let outcome = artifact_name_for(schema, &record, kind).and_then(|name| {
            store.put(&name, &record, schema)?;
            Ok(name)
        });
        match outcome {
            Ok(name) => report.succeeded.push(name.to_string()),
            Err(err) => {
                let label = format!("row {}", index + 1);
                tracing::warn!(row = index + 1, "Row not stored: {err}");
                report.record_failure(label, &err);
            }
        }
    }

    report.duration = start.elapsed();
    tracing::info!("{}", report.summary());
    Ok(report)
}

/// Read the single-record workbook at `path` into `store` under the same base name.
pub fn import_xlsx(path: &Path, schema: &StyleSchema, store: &RecordStore) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = ArtifactName::parse(&stem)?;

    let contents = read_xlsx(path)?;
    let mut records = contents.records();
    let (Some(record), None) = (records.next(), records.next()) else {
        return Err(CaselyError::NotAtomic {
            artifact: name.to_string(),
            rows: contents.rows.len(),
        });
    };

    store.put(&name, &record, schema)
}
