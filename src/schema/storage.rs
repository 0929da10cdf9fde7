//! Persisted form of the style schema.

use super::model::StyleSchema;
use crate::error::{CaselyError, Result, ResultExt as _};
use crate::utils::write_atomic;
use std::fs;
use std::path::Path;

/// File name of the schema inside a project directory.
pub const SCHEMA_FILE_NAME: &str = "style_schema.json";

/// Write `schema` as pretty JSON.
///
/// Refuses to replace an existing file unless `overwrite` is set, since the
/// file may carry manual edits.
pub fn save_schema(schema: &StyleSchema, path: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Err(CaselyError::Config(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }

    schema.check_integrity()?;
    let mut json = schema.to_json()?;
    json.push('\n');
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), columns = schema.len(), "Saved style schema");
    Ok(())
}

/// Read and check the schema at `path`.
///
/// Always reads the file, so an external edit is picked up by the next call.
pub fn load_schema(path: &Path) -> Result<StyleSchema> {
    if !path.is_file() {
        return Err(CaselyError::InvalidPath(format!(
            "style schema not found: {}",
            path.display()
        )));
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read style schema {}", path.display()))?;
    let schema = StyleSchema::from_json(&json).map_err(|e| match e {
        CaselyError::Json(err) => {
            CaselyError::InvalidSchema(format!("{}: {err}", path.display()))
        }
        other => other,
    })?;

    tracing::debug!(path = %path.display(), columns = schema.len(), "Loaded style schema");
    Ok(schema)
}
