//! Batch export: exactly one spreadsheet per text artifact.
//!
//! The orchestrator walks a [`RecordStore`] and, for every artifact, either
//! writes `{name}.xlsx` into the destination or records why it could not.
//! Per-artifact problems never stop the batch.
//!
//! Work is split in two phases:
//!
//! 1. Planning (serial): list artifacts in lexical order and allocate every
//!    sheet name, so collision suffixes do not depend on scheduling. The
//!    lexically first artifact keeps the plain name: of
//!    `functional_TC001_Login!` and `functional_TC001_login`, the former sorts
//!    first (`L` < `l`), so the latter gets the sheet `functional_TC001_login_2`.
//! 2. Rendering (serial or parallel): read, validate, render and write each
//!    artifact. All workers share one schema snapshot.
//!
//! The destination mirrors the source: when an artifact fails, a workbook left
//! for it by an earlier run is removed, so only successful artifacts have one.

use crate::error::{CaselyError, Result, ResultExt as _};
use crate::record::{ArtifactName, RecordStore, check_record};
use crate::render::{
    SPREADSHEET_EXTENSION, SheetNameRegistry, WidthBounds, to_sheet, write_xlsx,
};
use crate::report::BatchReport;
use crate::schema::StyleSchema;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Knobs for one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Render artifacts on the rayon thread pool.
    pub parallel: bool,
    pub width_bounds: WidthBounds,
    /// When set, no new artifact is started; artifacts in flight finish.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ExportOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// One planned artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub artifact: ArtifactName,
    pub sheet_name: String,
}

enum Outcome {
    Exported,
    Failed(CaselyError),
    Skipped,
}

/// Projects a text artifact set into spreadsheet artifacts.
#[derive(Debug, Clone)]
pub struct ExportOrchestrator {
    schema: Arc<StyleSchema>,
    options: ExportOptions,
}

impl ExportOrchestrator {
    pub fn new(schema: Arc<StyleSchema>) -> Self {
        Self {
            schema,
            options: ExportOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &StyleSchema {
        &self.schema
    }

    /// Artifacts in lexical order with their allocated sheet names.
    pub fn plan(&self, source: &RecordStore) -> Result<Vec<ExportJob>> {
        let mut registry = SheetNameRegistry::new();
        Ok(source
            .list()?
            .map(|artifact| {
                let sheet_name = registry.allocate(artifact.as_str());
                ExportJob {
                    artifact,
                    sheet_name,
                }
            })
            .collect())
    }

    /// Export every artifact of `source` into `dest`.
    ///
    /// # Errors
    ///
    /// Only batch-level problems are errors: an unreadable source, an
    /// uncreatable destination, or cancellation before the first artifact.
    /// Everything else ends up in the returned [`BatchReport`].
    pub fn run(&self, source: &RecordStore, dest: &Path) -> Result<BatchReport> {
        let start = Instant::now();
        if self.options.is_cancelled() {
            return Err(CaselyError::Aborted);
        }

        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let jobs = self.plan(source)?;
        let strays = source.stray_files()?;
        tracing::info!(
            artifacts = jobs.len() + strays.len(),
            source = %source.root().display(),
            dest = %dest.display(),
            parallel = self.options.parallel,
            "Starting export"
        );

        let outcomes: Vec<Outcome> = if self.options.parallel {
            jobs.par_iter()
                .map(|job| self.process(source, job, dest))
                .collect()
        } else {
            jobs.iter()
                .map(|job| self.process(source, job, dest))
                .collect()
        };

        let mut report = BatchReport::default();
        for (job, outcome) in jobs.iter().zip(outcomes) {
            let artifact = job.artifact.to_string();
            match outcome {
                Outcome::Exported => report.succeeded.push(artifact),
                Outcome::Skipped => report.skipped.push(artifact),
                Outcome::Failed(err) => {
                    tracing::warn!(artifact = %artifact, "Export failed: {err}");
                    report.record_failure(artifact, &err);
                }
            }
        }

        for path in strays {
            let file_name = stray_label(&path);
            let err = CaselyError::InvalidArtifactName(file_name.clone());
            tracing::warn!(artifact = %file_name, "Export failed: {err}");
            report.record_failure(file_name, &err);
        }

        report.duration = start.elapsed();
        tracing::info!("{}", report.summary());
        Ok(report)
    }

    fn process(&self, source: &RecordStore, job: &ExportJob, dest: &Path) -> Outcome {
        if self.options.is_cancelled() {
            return Outcome::Skipped;
        }
        match self.export_one(source, job, dest) {
            Ok(path) => {
                tracing::debug!(artifact = %job.artifact, path = %path.display(), "Exported");
                Outcome::Exported
            }
            Err(err) => {
                discard_stale(job, dest);
                Outcome::Failed(err)
            }
        }
    }

    fn export_one(&self, source: &RecordStore, job: &ExportJob, dest: &Path) -> Result<PathBuf> {
        let record = source.get(&job.artifact)?;
        check_record(&self.schema, &record)?;

        let sheet = to_sheet(
            &self.schema,
            &record,
            &job.sheet_name,
            self.options.width_bounds,
        );
        let target = dest.join(job.artifact.file_name(SPREADSHEET_EXTENSION));
        write_xlsx(&sheet, &target).map_err(|e| CaselyError::Export {
            artifact: job.artifact.to_string(),
            reason: e.to_string(),
        })?;
        Ok(target)
    }
}

/// Remove the workbook an earlier run wrote for a now failing artifact.
fn discard_stale(job: &ExportJob, dest: &Path) {
    let target = dest.join(job.artifact.file_name(SPREADSHEET_EXTENSION));
    if !target.is_file() {
        return;
    }
    match fs::remove_file(&target) {
        Ok(()) => tracing::info!(artifact = %job.artifact, "Removed stale workbook"),
        Err(e) => tracing::warn!(
            artifact = %job.artifact,
            path = %target.display(),
            "Failed to remove stale workbook: {e}"
        ),
    }
}

/// Strays are reported by file name, since their stem may look valid.
fn stray_label(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Check every artifact of `source` against `schema` without writing anything.
pub fn validate_store(schema: &StyleSchema, source: &RecordStore) -> Result<BatchReport> {
    let start = Instant::now();
    let mut report = BatchReport::default();

    for artifact in source.list()? {
        match source
            .get(&artifact)
            .and_then(|record| check_record(schema, &record))
        {
            Ok(()) => report.succeeded.push(artifact.to_string()),
            Err(err) => report.record_failure(artifact.to_string(), &err),
        }
    }
    for path in source.stray_files()? {
        let file_name = stray_label(&path);
        report.record_failure(file_name.clone(), &CaselyError::InvalidArtifactName(file_name));
    }

    report.duration = start.elapsed();
    Ok(report)
}
