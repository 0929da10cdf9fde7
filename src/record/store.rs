//! Directory-backed artifact set: one `.md` file per record.

use super::model::Record;
use super::naming::ArtifactName;
use super::validator::check_record;
use crate::error::{CaselyError, Result, ResultExt as _};
use crate::render::to_text;
use crate::schema::StyleSchema;
use crate::table::parse_table;
use crate::utils::{extension_of, write_atomic};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of text artifacts.
pub const TEXT_EXTENSION: &str = "md";

/// A directory holding one text artifact per record.
///
/// Existing artifacts are never replaced unless overwrite was enabled with
/// [`RecordStore::with_overwrite`].
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
    overwrite: bool,
}

impl RecordStore {
    /// Open an existing store directory.
    ///
    /// # Errors
    ///
    /// [`CaselyError::InvalidPath`] when `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CaselyError::InvalidPath(format!(
                "artifact directory not found: {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            overwrite: false,
        })
    }

    /// Open a store, creating the directory when missing.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create {}", root.display()))?;
        Self::open(root)
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &ArtifactName) -> PathBuf {
        self.root.join(name.file_name(TEXT_EXTENSION))
    }

    pub fn contains(&self, name: &ArtifactName) -> bool {
        self.path_for(name).is_file()
    }

    /// Validate `record` and store it as `name.md`.
    ///
    /// # Errors
    ///
    /// [`CaselyError::Validation`] when the record does not fit `schema`,
    /// [`CaselyError::DuplicateArtifact`] when the artifact exists and
    /// overwrite is off.
    pub fn put(
        &self,
        name: &ArtifactName,
        record: &Record,
        schema: &StyleSchema,
    ) -> Result<PathBuf> {
        check_record(schema, record)?;

        let path = self.path_for(name);
        if path.exists() && !self.overwrite {
            return Err(CaselyError::DuplicateArtifact(name.to_string()));
        }

        write_atomic(&path, to_text(schema, record).as_bytes())?;
        tracing::debug!(artifact = %name, "Stored record");
        Ok(path)
    }

    /// Read the single record stored under `name`.
    ///
    /// # Errors
    ///
    /// [`CaselyError::ArtifactNotFound`], [`CaselyError::MalformedTable`], or
    /// [`CaselyError::NotAtomic`] when the file holds more than one row.
    pub fn get(&self, name: &ArtifactName) -> Result<Record> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(CaselyError::ArtifactNotFound(name.to_string()));
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let table = parse_table(&text)?;
        if table.row_count() != 1 {
            return Err(CaselyError::NotAtomic {
                artifact: name.to_string(),
                rows: table.row_count(),
            });
        }

        table
            .records()
            .next()
            .ok_or_else(|| CaselyError::ArtifactNotFound(name.to_string()))
    }

    /// Artifact names in lexical order.
    ///
    /// Each call takes a fresh snapshot of the directory, so the iterator is
    /// finite and can be restarted by calling again.
    pub fn list(&self) -> Result<impl Iterator<Item = ArtifactName> + use<>> {
        let (mut names, _) = self.scan()?;
        names.sort();
        Ok(names.into_iter())
    }

    /// Text files that cannot be addressed by name: the stem is not a valid
    /// artifact name, or the extension is not exactly `md` (e.g. `.MD`).
    pub fn stray_files(&self) -> Result<Vec<PathBuf>> {
        let (_, mut strays) = self.scan()?;
        strays.sort();
        Ok(strays)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.scan()?.0.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn scan(&self) -> Result<(Vec<ArtifactName>, Vec<PathBuf>)> {
        let mut names = Vec::new();
        let mut strays = Vec::new();

        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list {}", self.root.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || extension_of(&path) != TEXT_EXTENSION {
                continue;
            }
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            // Hidden files include in-flight temporaries.
            if stem.starts_with('.') {
                continue;
            }
            // `path_for` only ever builds the lowercase extension, so `.MD` is a stray.
            let exact_extension = path
                .extension()
                .is_some_and(|ext| ext == TEXT_EXTENSION);
            match ArtifactName::parse(&stem) {
                Ok(name) if exact_extension => names.push(name),
                _ => strays.push(path),
            }
        }
        Ok((names, strays))
    }
}
