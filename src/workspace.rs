//! Project layout and discovery.
//!
//! A project directory looks like:
//!
//! ```text
//! projects/<name>/
//!   input/requirements/    raw requirement documents
//!   input/examples/        raw example test cases
//!   processed/requirements/
//!   processed/examples/    examples converted to text tables
//!   results/               one `.md` artifact per test case
//!   exports/               one `.xlsx` artifact per test case
//!   style_schema.json
//! ```
//!
//! Creating these directories is someone else's job; this module only finds them.

use crate::error::{CaselyError, Result, ResultExt as _};
use crate::record::TEXT_EXTENSION;
use crate::schema::SCHEMA_FILE_NAME;
use crate::utils::extension_of;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Paths of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout of the most recently modified project under `projects_dir`.
    pub fn discover(projects_dir: &Path) -> Result<Self> {
        find_latest_project(projects_dir)?.map(Self::new).ok_or_else(|| {
            CaselyError::InvalidPath(format!(
                "no paths given and no projects found in {}",
                projects_dir.display()
            ))
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn requirements_dir(&self) -> PathBuf {
        self.root.join("input").join("requirements")
    }

    pub fn raw_examples_dir(&self) -> PathBuf {
        self.root.join("input").join("examples")
    }

    pub fn processed_requirements_dir(&self) -> PathBuf {
        self.root.join("processed").join("requirements")
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.root.join("processed").join("examples")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE_NAME)
    }

    /// Processed example tables, sorted by path.
    pub fn example_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.examples_dir();
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to list examples in {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && extension_of(&path) == TEXT_EXTENSION {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Most recently modified sub-directory of `projects_dir`, if any.
pub fn find_latest_project(projects_dir: &Path) -> Result<Option<PathBuf>> {
    if !projects_dir.is_dir() {
        return Ok(None);
    }

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(projects_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        // Ties resolve to the larger path so the answer does not depend on listing order.
        let newer = latest
            .as_ref()
            .is_none_or(|(time, best)| (modified, &path) > (*time, best));
        if newer {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_no_projects() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(find_latest_project(&dir.path().join("missing"))?, None);
        assert_eq!(find_latest_project(dir.path())?, None);
        assert!(ProjectLayout::discover(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_latest_project_wins() -> Result<()> {
        let dir = tempdir()?;
        let old = dir.path().join("alpha");
        let new = dir.path().join("beta");
        fs::create_dir(&old)?;
        fs::create_dir(&new)?;
        fs::write(dir.path().join("stray.txt"), "")?;

        let past = SystemTime::now() - Duration::from_secs(3600);
        fs::File::open(&old)?.set_modified(past)?;

        let layout = ProjectLayout::discover(dir.path())?;
        assert_eq!(layout.root(), new);
        assert_eq!(layout.name(), "beta");
        assert_eq!(layout.results_dir(), new.join("results"));
        assert_eq!(layout.schema_path(), new.join("style_schema.json"));
        Ok(())
    }

    #[test]
    fn test_example_files_are_sorted_markdown() -> Result<()> {
        let dir = tempdir()?;
        let layout = ProjectLayout::new(dir.path());
        fs::create_dir_all(layout.examples_dir())?;
        for name in ["b.md", "a.md", "c.txt"] {
            fs::write(layout.examples_dir().join(name), "")?;
        }
        let files = layout.example_files()?;
        assert_eq!(
            files,
            vec![layout.examples_dir().join("a.md"), layout.examples_dir().join("b.md")]
        );
        Ok(())
    }
}
