//! Spawning the managed application (or the updated launcher).
//!
//! The launcher's only job after an install is to start the artifact as
//! an independent OS process and get out of the way: stdio is inherited,
//! the working directory is pinned to the install directory, and the
//! child is not waited on; the caller exits right after a successful
//! spawn.

use crate::core::LauncherError;
use crate::utils::platform;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Start `executable` with `args` as a detached process.
///
/// Returns as soon as the child is spawned; the child outlives this
/// process.
///
/// # Errors
///
/// - [`LauncherError::NotInstalled`] - the executable does not exist
/// - [`LauncherError::LaunchFailed`] - the OS refused to spawn it
pub fn spawn_detached(
    executable: &Path,
    args: &[String],
    working_dir: &Path,
) -> Result<(), LauncherError> {
    if !executable.is_file() {
        return Err(LauncherError::NotInstalled {
            artifact: executable.display().to_string(),
        });
    }

    // A freshly promoted artifact may not carry execute permission yet.
    platform::set_executable(executable)
        .map_err(|e| LauncherError::file_system("marking artifact executable", executable, e))?;

    let child = Command::new(executable)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| LauncherError::LaunchFailed {
            program: executable.display().to_string(),
            source: e,
        })?;

    info!("launched {} (pid {})", executable.display(), child.id());
    Ok(())
}
