//! Self-replacement of the running executable.
//!
//! A running process cannot reliably delete or overwrite its own loaded
//! executable image on every supported platform, so replacing the
//! launcher is a three-party dance:
//!
//! 1. The new artifact is downloaded to a staging file (ordinary
//!    download path).
//! 2. A small helper script is generated and started as an independent
//!    process ([`script`]), then the launcher records the new version and
//!    exits, releasing the OS lock on its own file.
//! 3. The helper retries deleting the destination until the lock clears,
//!    moves the staged file into place, relaunches the new executable,
//!    and deletes itself ([`protocol`]).
//!
//! The [`engine`] module drives these steps as an explicit state machine.
//! When the artifact being installed is *not* the running executable the
//! whole mechanism is bypassed in favor of a plain atomic rename.
//!
//! This design accepts a brief window, bounded by the helper's retry
//! budget, during which neither the old nor the new executable is
//! running.

pub mod engine;
pub mod protocol;
pub mod script;

pub use engine::{EngineState, Outcome, SelfReplaceEngine};
pub use protocol::{DestinationOps, RetryPolicy};
pub use script::HandoffScript;

use std::path::PathBuf;

/// A pending self-replacement, consumed once by the detached helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceRequest {
    /// Fully-written staging file to promote.
    pub staged_path: PathBuf,
    /// Final location, currently occupied by the running executable.
    pub destination_path: PathBuf,
    /// Command line to relaunch once the move is done; the first element
    /// is the executable (normally the destination path itself).
    pub relaunch_command: Vec<String>,
}

impl ReplaceRequest {
    /// Request that relaunches the replaced executable with no arguments.
    #[must_use]
    pub fn relaunching_destination(staged_path: PathBuf, destination_path: PathBuf) -> Self {
        let relaunch = destination_path.display().to_string();
        Self {
            staged_path,
            destination_path,
            relaunch_command: vec![relaunch],
        }
    }
}
