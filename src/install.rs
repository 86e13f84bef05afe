//! Installation records and the atomic finalize step.
//!
//! A record is one flat key-value TOML file per artifact kind recording
//! what is installed where:
//!
//! ```toml
//! version = "v1.4.0"
//! path = "/home/user/.updraft/app.AppImage"
//! ```
//!
//! Reads degrade gracefully: a missing or corrupt record is treated
//! identically to "never installed", so a damaged file can never block
//! reinstallation.

use crate::constants::NEVER_INSTALLED_VERSION;
use crate::core::LauncherError;
use crate::utils::fs::atomic_write;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What is currently installed for one artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Version string recorded at install time.
    pub version: String,
    /// Where the artifact was installed.
    pub path: PathBuf,
}

impl InstallationRecord {
    /// Load a record, degrading to `None` on any read or parse problem.
    #[must_use]
    pub fn load(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("no installation record at {}: {e}", path.display());
                return None;
            }
        };
        match toml::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("corrupt installation record at {}: {e}", path.display());
                None
            }
        }
    }

    /// Persist the record atomically.
    ///
    /// # Errors
    ///
    /// Fails with [`LauncherError::FileSystem`] when the record cannot be
    /// serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), LauncherError> {
        let content = toml::to_string(self).map_err(|e| {
            LauncherError::file_system(
                "serializing installation record",
                path,
                std::io::Error::other(e),
            )
        })?;
        atomic_write(path, content.as_bytes()).map_err(|e| {
            LauncherError::file_system(
                "writing installation record",
                path,
                std::io::Error::other(e),
            )
        })?;
        debug!("recorded {} at {}", self.version, path.display());
        Ok(())
    }
}

/// Version to compare releases against: the recorded one, or the lowest
/// possible baseline when no valid record exists.
#[must_use]
pub fn installed_version(record_path: &Path) -> String {
    InstallationRecord::load(record_path)
        .map_or_else(|| NEVER_INSTALLED_VERSION.to_string(), |r| r.version)
}

/// Atomically promote a fully-written staged file to its destination.
///
/// A same-directory rename, so a concurrent reader sees either the old
/// complete file or the new complete file, never a partial one.
///
/// # Errors
///
/// Fails with [`LauncherError::FileSystem`] when the rename fails; the
/// staged file is left in place for inspection in that case.
pub fn promote(staged: &Path, destination: &Path) -> Result<(), LauncherError> {
    std::fs::rename(staged, destination).map_err(|e| {
        LauncherError::file_system(
            format!("moving staged file into place at {}", destination.display()),
            staged,
            e,
        )
    })?;
    debug!("promoted {} -> {}", staged.display(), destination.display());
    Ok(())
}
