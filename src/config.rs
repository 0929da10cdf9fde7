//! Persistent user configuration.
//!
//! Stored as JSON at `<config_dir>/casely/config.json`. A missing file means
//! defaults; missing keys fall back to their defaults too. Command-line flags
//! override whatever is loaded here.

use crate::error::{CaselyError, Result, ResultExt as _};
use crate::render::WidthBounds;
use crate::schema::{DEFAULT_ENUM_THRESHOLD, ExtractOptions};
use crate::utils::write_atomic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Casely configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaselyConfig {
    /// Largest distinct-value count still classified as enumerated (inclusive)
    pub enum_threshold: usize,
    /// Narrowest exported column, in character units
    pub min_column_width: u16,
    /// Widest exported column, in character units
    pub max_column_width: u16,
    /// Directory holding one sub-directory per project
    pub projects_dir: PathBuf,
    /// Whether `split` may replace existing artifacts
    pub overwrite: bool,
    /// Whether export renders artifacts in parallel
    pub parallel: bool,
    /// Whether logs are also written to rolling files
    pub log_to_file: bool,
}

impl Default for CaselyConfig {
    fn default() -> Self {
        Self {
            enum_threshold: DEFAULT_ENUM_THRESHOLD,
            min_column_width: 10,
            max_column_width: 60,
            projects_dir: PathBuf::from("projects"),
            overwrite: false,
            parallel: false,
            log_to_file: true,
        }
    }
}

impl CaselyConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CaselyError::Config("Failed to get config directory".to_owned()))?;
        Ok(config_dir.join("casely").join("config.json"))
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            CaselyError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.check()?;
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes())
    }

    fn check(&self) -> Result<()> {
        if self.min_column_width > self.max_column_width {
            return Err(CaselyError::Config(format!(
                "min_column_width ({}) exceeds max_column_width ({})",
                self.min_column_width, self.max_column_width
            )));
        }
        Ok(())
    }

    pub fn width_bounds(&self) -> WidthBounds {
        WidthBounds::new(self.min_column_width, self.max_column_width)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            enum_threshold: self.enum_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = CaselyConfig::load_from(&dir.path().join("config.json"))?;
        assert_eq!(config, CaselyConfig::default());
        assert_eq!(config.enum_threshold, 8);
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "enum_threshold": 5, "parallel": true }"#)?;

        let config = CaselyConfig::load_from(&path)?;
        assert_eq!(config.enum_threshold, 5);
        assert!(config.parallel);
        assert_eq!(config.max_column_width, 60);
        Ok(())
    }

    #[test]
    fn test_save_roundtrip_and_bounds_check() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.json");
        let config = CaselyConfig {
            overwrite: true,
            ..Default::default()
        };
        config.save_to(&path)?;
        assert_eq!(CaselyConfig::load_from(&path)?, config);

        let broken = CaselyConfig {
            min_column_width: 80,
            ..Default::default()
        };
        assert!(matches!(broken.save_to(&path), Err(CaselyError::Config(_))));
        Ok(())
    }
}
