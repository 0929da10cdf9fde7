//! Small filesystem helpers shared by the stores.

use crate::error::{Result, ResultExt as _};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Temporary sibling used while `path` is being written.
fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Write `bytes` to `path` so that readers never observe a partial file.
///
/// The content goes to a hidden temporary sibling which is then renamed over
/// `path`. The temporary file is removed on every failure path.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let temp_path = temp_sibling(path);
    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();

    if let Err(e) = written.and_then(|()| fs::rename(&temp_path, path)) {
        let _ignored = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Lowercased extension of `path`, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}
