//! File system utilities.
//!
//! All destination writes in this crate go through [`atomic_write`] or a
//! same-directory rename so that readers never observe a partial file.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Create a directory and all parents if they do not exist.
///
/// Succeeds silently when the directory is already present.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(())
}

/// Write a file atomically: write to a `.tmp` sibling, sync, then rename.
///
/// The rename stays within the target directory, so it is atomic with
/// respect to crashes and concurrent readers on every supported platform.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// Remove a file, ignoring the case where it does not exist.
pub fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Delete leftover staging files (`*.<suffix>`) from a directory.
///
/// Called opportunistically on startup; a staging file left behind by a
/// cancelled download is harmless and is simply truncated or swept here.
/// Errors on individual entries are logged and skipped.
pub fn sweep_extension(dir: &Path, suffix: &str) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(suffix) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("swept stale staging file {}", path.display()),
                Err(e) => debug!("could not sweep {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent.
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn ensure_dir_rejects_file_collision() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    #[test]
    fn atomic_write_replaces_content_without_tmp_leftover() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("record.toml");

        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn remove_if_exists_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope");
        remove_if_exists(&path).unwrap();

        fs::write(&path, "x").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn sweep_extension_only_touches_matching_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.part"), "stale").unwrap();
        fs::write(tmp.path().join("app"), "installed").unwrap();

        sweep_extension(tmp.path(), "part");

        assert!(!tmp.path().join("app.part").exists());
        assert!(tmp.path().join("app").exists());
    }
}
