//! End-to-end checks: examples in, schema out, atomic artifacts, spreadsheets back.

use casely::error::{CaselyError, Result};
use casely::export::{ExportOptions, ExportOrchestrator, validate_store};
use casely::ingest::{import_xlsx, split_table};
use casely::record::{ArtifactName, CellValue, Record, RecordStore, ValidationError};
use casely::render::read_xlsx;
use casely::report::FailureKind;
use casely::schema::{
    ColumnKind, ExtractOptions, StepNumbering, StyleSchema, extract_schema, load_schema,
    save_schema,
};
use casely::table::parse_table;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const EXAMPLE: &str = "\
Login test cases used as the style reference.

| ID | Title | Steps | Expected Result | Priority |
| --- | --- | --- | --- | --- |
| TC-001 | Login with valid credentials | 1. Open login page<br>2. Enter valid credentials<br>3. Press Sign in | Dashboard is shown | High |
| TC-002 | Login with wrong password | 1. Open login page<br>2. Enter wrong password | Error \\| retry prompt | Medium |
| TC-003 | Password reset link | 1. Open login page<br>2. Click Forgot password | Reset email is sent | Low |
| TC-004 | Remember me | 1. Tick Remember me<br>2. Sign in | Session persists | Medium |
";

fn example_schema() -> Result<StyleSchema> {
    Ok(extract_schema(&[parse_table(EXAMPLE)?], &ExtractOptions::default())?)
}

fn record(id: &str, title: &str, priority: &str) -> Record {
    Record::new()
        .with("ID", id)
        .with("Title", title)
        .with("Steps", CellValue::from_lines(["1. Open app", "2. Check screen"]))
        .with("Expected Result", "Screen is shown")
        .with("Priority", priority)
}

fn write_artifact(dir: &Path, name: &str, schema: &StyleSchema, record: &Record) -> Result<()> {
    fs::write(
        dir.join(format!("{name}.md")),
        casely::render::to_text(schema, record),
    )?;
    Ok(())
}

#[test]
fn test_extracted_schema_matches_examples() -> Result<()> {
    let schema = example_schema()?;

    assert_eq!(
        schema.column_names().collect::<Vec<_>>(),
        ["ID", "Title", "Steps", "Expected Result", "Priority"]
    );
    let priority = schema.column("Priority").ok_or(CaselyError::Other("no Priority".into()))?;
    assert_eq!(priority.kind, ColumnKind::Enumerated);
    assert_eq!(
        priority.allowed_values.iter().map(String::as_str).collect::<Vec<_>>(),
        ["High", "Low", "Medium"]
    );
    assert!(schema.columns.iter().all(|c| c.required));
    assert_eq!(schema.meta.step_numbering, StepNumbering::Numbered);
    assert_eq!(schema.meta.language, "en");
    Ok(())
}

#[test]
fn test_schema_is_stable_under_row_reordering() -> Result<()> {
    let mut lines: Vec<&str> = EXAMPLE.lines().collect();
    let data_start = lines.len() - 4;
    lines[data_start..].reverse();
    let reordered = lines.join("\n");

    let schema = example_schema()?;
    let again = extract_schema(&[parse_table(&reordered)?], &ExtractOptions::default())?;
    assert_eq!(schema, again);
    Ok(())
}

#[test]
fn test_schema_survives_save_and_manual_edit() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("style_schema.json");
    let schema = example_schema()?;

    save_schema(&schema, &path, false)?;
    assert!(save_schema(&schema, &path, false).is_err());
    assert_eq!(load_schema(&path)?, schema);

    let edited = fs::read_to_string(&path)?.replace("\"Medium\"", "\"Critical\"");
    fs::write(&path, edited)?;
    let reloaded = load_schema(&path)?;
    let store = RecordStore::create(dir.path().join("results"))?;
    let name = ArtifactName::parse("functional_TC9_critical")?;
    store.put(&name, &record("TC-9", "Critical path", "Critical"), &reloaded)?;
    assert!(store.contains(&name));
    Ok(())
}

#[test]
fn test_split_then_export_one_workbook_per_artifact() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    let results = RecordStore::create(dir.path().join("results"))?;

    let split = split_table(&parse_table(EXAMPLE)?, "functional", &schema, &results)?;
    assert!(split.is_success());
    assert_eq!(results.len()?, 4);

    let exports = dir.path().join("exports");
    let report = ExportOrchestrator::new(Arc::new(schema.clone())).run(&results, &exports)?;
    assert!(report.is_success());
    assert_eq!(report.succeeded.len(), 4);

    let workbooks: Vec<_> = fs::read_dir(&exports)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(workbooks.len(), 4);

    let login = exports.join("functional_TC-001_login_with_valid_credentials.xlsx");
    let contents = read_xlsx(&login)?;
    assert_eq!(contents.headers, schema.column_names().collect::<Vec<_>>());
    assert_eq!(contents.rows.len(), 1);
    let steps = contents.records().next().and_then(|r| r.get("Steps").cloned());
    assert_eq!(
        steps,
        Some(CellValue::from_lines([
            "1. Open login page",
            "2. Enter valid credentials",
            "3. Press Sign in",
        ]))
    );
    Ok(())
}

#[test]
fn test_one_bad_artifact_does_not_stop_the_batch() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    let results = dir.path().join("results");
    fs::create_dir_all(&results)?;

    for i in 1..=4 {
        write_artifact(
            &results,
            &format!("functional_TC{i}_case"),
            &schema,
            &record(&format!("TC-{i}"), "Case", "High"),
        )?;
    }
    write_artifact(
        &results,
        "functional_TC5_critical",
        &schema,
        &record("TC-5", "Critical", "Critical"),
    )?;

    let store = RecordStore::open(&results)?;
    let exports = dir.path().join("exports");
    let report = ExportOrchestrator::new(Arc::new(schema))
        .with_options(ExportOptions {
            parallel: true,
            ..ExportOptions::default()
        })
        .run(&store, &exports)?;

    assert!(!report.is_success());
    assert_eq!(report.total(), 5);
    assert_eq!(report.succeeded.len(), 4);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.artifact, "functional_TC5_critical");
    assert_eq!(failure.kind, FailureKind::Validation);
    assert!(failure.reason.contains("Critical"));
    assert!(!exports.join("functional_TC5_critical.xlsx").exists());
    Ok(())
}

#[test]
fn test_colliding_sheet_names_get_suffixes() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    let results = dir.path().join("results");
    fs::create_dir_all(&results)?;
    let rec = record("TC001", "Login", "High");
    write_artifact(&results, "functional_TC001_Login!", &schema, &rec)?;
    write_artifact(&results, "functional_TC001_login", &schema, &rec)?;

    let store = RecordStore::open(&results)?;
    let exports = dir.path().join("exports");
    let orchestrator = ExportOrchestrator::new(Arc::new(schema));
    let sheets: Vec<String> = orchestrator
        .plan(&store)?
        .into_iter()
        .map(|job| job.sheet_name)
        .collect();
    assert_eq!(sheets, ["functional_TC001_Login", "functional_TC001_login_2"]);

    let report = orchestrator.run(&store, &exports)?;
    assert!(report.is_success());
    let second = read_xlsx(&exports.join("functional_TC001_login.xlsx"))?;
    assert_eq!(second.name, "functional_TC001_login_2");
    Ok(())
}

#[test]
fn test_missing_and_empty_title_are_rejected() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    let store = RecordStore::create(dir.path())?;
    let name = ArtifactName::parse("functional_TC7_untitled")?;

    let mut missing = record("TC-7", "x", "Low");
    missing.remove("Title");
    match store.put(&name, &missing, &schema) {
        Err(CaselyError::Validation(errors)) => assert_eq!(
            errors,
            vec![ValidationError::MissingColumn {
                column: "Title".to_owned()
            }]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }

    let empty = missing.with("Title", "");
    match store.put(&name, &empty, &schema) {
        Err(CaselyError::Validation(errors)) => assert_eq!(
            errors,
            vec![ValidationError::RequiredFieldEmpty {
                column: "Title".to_owned()
            }]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(!store.contains(&name));
    Ok(())
}

#[test]
fn test_validate_store_reports_every_artifact() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    write_artifact(dir.path(), "ui_TC1_ok", &schema, &record("TC-1", "Ok", "Low"))?;
    write_artifact(dir.path(), "ui_TC2_bad", &schema, &record("TC-2", "Bad", "Blocker"))?;
    fs::write(dir.path().join("notes.md"), "free text")?;

    let report = validate_store(&schema, &RecordStore::open(dir.path())?)?;
    assert_eq!(report.succeeded, ["ui_TC1_ok"]);
    let failed: Vec<_> = report.failures.iter().map(|f| f.artifact.as_str()).collect();
    assert!(failed.contains(&"ui_TC2_bad"));
    Ok(())
}

#[test]
fn test_import_reads_exported_workbook_back() -> Result<()> {
    let dir = tempdir()?;
    let schema = example_schema()?;
    let results = RecordStore::create(dir.path().join("results"))?;
    let name = ArtifactName::parse("functional_TC3_reset")?;
    let original = record("TC-3", "Reset", "Low");
    results.put(&name, &original, &schema)?;

    let exports = dir.path().join("exports");
    ExportOrchestrator::new(Arc::new(schema.clone())).run(&results, &exports)?;

    let restored = RecordStore::create(dir.path().join("restored"))?;
    import_xlsx(&exports.join("functional_TC3_reset.xlsx"), &schema, &restored)?;
    assert_eq!(restored.get(&name)?, original);
    Ok(())
}
