//! Centralized error handling for casely.
//!
//! Every fallible library operation returns [`Result<T>`], whose error type is
//! [`CaselyError`]. The variants mirror how far a failure is allowed to travel:
//!
//! - Structural failures ([`CaselyError::MalformedTable`],
//!   [`CaselyError::SchemaConflict`], [`CaselyError::InvalidSchema`]) abort the
//!   single operation they belong to.
//! - Per-artifact failures ([`CaselyError::Validation`],
//!   [`CaselyError::DuplicateArtifact`], [`CaselyError::Export`], ...) are caught
//!   by batch operations and reported, never allowed to stop the batch.
//!
//! ```
//! use casely::error::CaselyError;
//!
//! fn describe(err: &CaselyError) -> &'static str {
//!     if err.is_per_artifact() { "skip and report" } else { "abort" }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`CaselyError`]:
//!
//! ```no_run
//! use casely::error::ResultExt as _;
//!
//! fn load() -> casely::error::Result<String> {
//!     std::fs::read_to_string("style_schema.json").context("Failed to read style schema")
//! }
//! ```

use crate::record::ValidationError;
use crate::schema::SchemaConflictError;
use crate::table::MalformedTableError;
use thiserror::Error;

/// Main error type for casely operations.
#[derive(Debug, Error)]
pub enum CaselyError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text could not be parsed as a single table
    #[error("Malformed table: {0}")]
    MalformedTable(#[from] MalformedTableError),

    /// Example tables disagree on their structure
    #[error("Schema conflict: {0}")]
    SchemaConflict(#[from] SchemaConflictError),

    /// A persisted schema breaks a schema invariant
    #[error("Invalid style schema: {0}")]
    InvalidSchema(String),

    /// A record was rejected by the validator
    #[error("Record rejected: {}", join_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    /// An artifact with this name already exists and overwrite was not requested
    #[error("Artifact already exists: {0}")]
    DuplicateArtifact(String),

    /// No artifact with this name exists in the store
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Name does not follow `{type}_{id}_{shortDescription}`
    #[error("Invalid artifact name '{0}': expected {{type}}_{{id}}_{{shortDescription}}")]
    InvalidArtifactName(String),

    /// An artifact file holds more (or fewer) than one record
    #[error("Artifact '{artifact}' holds {rows} records, expected exactly one")]
    NotAtomic { artifact: String, rows: usize },

    /// Rendering or writing one exported artifact failed
    #[error("Export of '{artifact}' failed: {reason}")]
    Export { artifact: String, reason: String },

    /// Spreadsheet library errors (reading or writing workbooks)
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found or invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Operation cancelled before it started
    #[error("Operation aborted by user")]
    Aborted,

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl CaselyError {
    /// Whether this error concerns a single artifact and must not abort a batch.
    pub fn is_per_artifact(&self) -> bool {
        matches!(
            self,
            Self::MalformedTable(_)
                | Self::Validation(_)
                | Self::DuplicateArtifact(_)
                | Self::ArtifactNotFound(_)
                | Self::InvalidArtifactName(_)
                | Self::NotAtomic { .. }
                | Self::Export { .. }
        )
    }
}

fn join_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<rust_xlsxwriter::XlsxError> for CaselyError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<calamine::XlsxError> for CaselyError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<anyhow::Error> for CaselyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<CaselyError> for String {
    fn from(err: CaselyError) -> Self {
        err.to_string()
    }
}

/// Result type alias for casely operations.
pub type Result<T> = std::result::Result<T, CaselyError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CaselyError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CaselyError = e.into();
            CaselyError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CaselyError = e.into();
            CaselyError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaselyError::DuplicateArtifact("functional_TC001_login".to_owned());
        assert_eq!(
            err.to_string(),
            "Artifact already exists: functional_TC001_login"
        );
    }

    #[test]
    fn test_validation_display_lists_every_reason() {
        let err = CaselyError::Validation(vec![
            ValidationError::MissingColumn {
                column: "Title".to_owned(),
            },
            ValidationError::ExtraColumn {
                column: "Notes".to_owned(),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("Title"), "{text}");
        assert!(text.contains("Notes"), "{text}");
    }

    #[test]
    fn test_per_artifact_classification() {
        assert!(CaselyError::ArtifactNotFound("x".to_owned()).is_per_artifact());
        assert!(!CaselyError::InvalidSchema("dup".to_owned()).is_per_artifact());
        assert!(!CaselyError::Aborted.is_per_artifact());
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = CaselyError::Aborted;
        let s: String = err.into();
        assert_eq!(s, "Operation aborted by user");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "style_schema.json",
        ));

        let result: Result<()> = result.context("Failed to read schema");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read schema")
        );
    }
}
