//! Outcome of a batch operation over an artifact set.
//!
//! Every batch ends with explicit counts and a listing of failures; a batch
//! that skips or fails an artifact is never reported as a success.

use crate::error::CaselyError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Broad category of a per-artifact failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedTable,
    Validation,
    Duplicate,
    NotAtomic,
    InvalidName,
    NotFound,
    Export,
    Io,
}

impl FailureKind {
    pub fn of(err: &CaselyError) -> Self {
        match err {
            CaselyError::MalformedTable(_) => Self::MalformedTable,
            CaselyError::Validation(_) => Self::Validation,
            CaselyError::DuplicateArtifact(_) => Self::Duplicate,
            CaselyError::NotAtomic { .. } => Self::NotAtomic,
            CaselyError::InvalidArtifactName(_) => Self::InvalidName,
            CaselyError::ArtifactNotFound(_) => Self::NotFound,
            CaselyError::Io(_) => Self::Io,
            _ => Self::Export,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedTable => "malformed_table",
            Self::Validation => "validation",
            Self::Duplicate => "duplicate",
            Self::NotAtomic => "not_atomic",
            Self::InvalidName => "invalid_name",
            Self::NotFound => "not_found",
            Self::Export => "export",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One artifact that did not make it through the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub artifact: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl BatchFailure {
    pub fn from_error(artifact: impl Into<String>, err: &CaselyError) -> Self {
        Self {
            artifact: artifact.into(),
            kind: FailureKind::of(err),
            reason: err.to_string(),
        }
    }
}

/// Report generated after a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Artifacts processed successfully, in processing order
    pub succeeded: Vec<String>,

    /// Artifacts that failed, with reasons
    pub failures: Vec<BatchFailure>,

    /// Artifacts not attempted because the batch was cancelled
    pub skipped: Vec<String>,

    /// Time taken for the batch
    pub duration: Duration,
}

/// Machine-readable summary printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary<'a> {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: &'a [BatchFailure],
    pub skipped_artifacts: &'a [String],
    pub duration_secs: f64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len() + self.skipped.len()
    }

    /// True when every artifact succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    pub fn record_failure(&mut self, artifact: impl Into<String>, err: &CaselyError) {
        self.failures.push(BatchFailure::from_error(artifact, err));
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} of {} artifacts succeeded, {} failed, {} skipped, {:.2}s",
            self.succeeded.len(),
            self.total(),
            self.failures.len(),
            self.skipped.len(),
            self.duration.as_secs_f64()
        );
        for failure in &self.failures {
            text.push_str(&format!(
                "\n  {} [{}]: {}",
                failure.artifact, failure.kind, failure.reason
            ));
        }
        text
    }

    pub fn to_summary(&self) -> BatchSummary<'_> {
        BatchSummary {
            total: self.total(),
            succeeded: self.succeeded.len(),
            failed: self.failures.len(),
            skipped: self.skipped.len(),
            failures: &self.failures,
            skipped_artifacts: &self.skipped,
            duration_secs: self.duration.as_secs_f64(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValidationError;

    #[test]
    fn test_report_counts_and_success() {
        let mut report = BatchReport {
            succeeded: vec!["a_1_x".to_owned(), "b_2_y".to_owned()],
            ..Default::default()
        };
        assert!(report.is_success());

        report.record_failure(
            "c_3_z",
            &CaselyError::Validation(vec![ValidationError::MissingColumn {
                column: "Title".to_owned(),
            }]),
        );
        assert!(!report.is_success());
        assert_eq!(report.total(), 3);
        assert!(report.summary().contains("c_3_z [validation]"));
    }

    #[test]
    fn test_json_summary_shape() {
        let mut report = BatchReport::default();
        report.succeeded.push("a_1_x".to_owned());
        report.record_failure("b_2_y", &CaselyError::DuplicateArtifact("b_2_y".to_owned()));
        report.skipped.push("c_3_z".to_owned());

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["skipped"], 1);
        assert_eq!(value["failures"][0]["artifact"], "b_2_y");
        assert_eq!(value["failures"][0]["kind"], "duplicate");
    }
}
