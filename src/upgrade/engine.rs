//! The self-replacement state machine.
//!
//! `Idle → Staged → AwaitingHandoff → Relaunching → Terminal`.
//!
//! The engine never exits the process itself: after a successful handoff
//! start it parks in [`EngineState::Relaunching`], the caller records the
//! newly installed version, marks the engine complete, and only then
//! terminates the process so the helper's retry loop can win the file
//! lock. Every failure before the helper starts lands in
//! `Terminal(Failed)` with the staged file removed and the current
//! process untouched.

use super::protocol::RetryPolicy;
use super::{ReplaceRequest, script};
use crate::core::LauncherError;
use crate::utils::{fs as fsutil, platform};
use std::path::Path;
use tracing::{info, warn};

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing staged yet.
    Idle,
    /// The replacement artifact sits fully written at the staging path.
    Staged,
    /// The helper process is being generated and spawned.
    AwaitingHandoff,
    /// The helper is running; this process must now exit.
    Relaunching,
    /// Finished, successfully or not.
    Terminal(Outcome),
}

/// How a replacement run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handoff started; the process should exit.
    Success,
    /// The replacement was abandoned; the old executable remains
    /// authoritative.
    Failed,
}

/// Returns `true` when installing to `destination` would replace the
/// currently running executable, which requires the handoff mechanism.
#[must_use]
pub fn replaces_running_executable(destination: &Path) -> bool {
    match std::env::current_exe() {
        Ok(current) => platform::paths_equal(&current, destination),
        Err(e) => {
            // Without a known self path, treat the install as ordinary;
            // the rename will fail loudly if the file is truly locked.
            warn!("cannot determine current executable path: {e}");
            false
        }
    }
}

/// Drives one self-replacement from staged artifact to handoff.
pub struct SelfReplaceEngine {
    request: ReplaceRequest,
    policy: RetryPolicy,
    state: EngineState,
}

impl SelfReplaceEngine {
    /// New engine in [`EngineState::Idle`] for the given request.
    #[must_use]
    pub fn new(request: ReplaceRequest) -> Self {
        Self {
            request,
            policy: RetryPolicy::default(),
            state: EngineState::Idle,
        }
    }

    /// Override the helper's retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current state, for observation by callers and tests.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The pending request.
    #[must_use]
    pub fn request(&self) -> &ReplaceRequest {
        &self.request
    }

    /// `Idle → Staged`: confirm the staged artifact is in place.
    ///
    /// # Errors
    ///
    /// Fails (and transitions to `Terminal(Failed)`) when the staging
    /// file does not exist.
    pub fn mark_staged(&mut self) -> Result<(), LauncherError> {
        debug_assert_eq!(self.state, EngineState::Idle);
        if !self.request.staged_path.is_file() {
            self.state = EngineState::Terminal(Outcome::Failed);
            return Err(LauncherError::file_system(
                "staged artifact missing",
                &self.request.staged_path,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        self.state = EngineState::Staged;
        Ok(())
    }

    /// `Staged → AwaitingHandoff → Relaunching`: generate the helper and
    /// start it.
    ///
    /// The engine does not wait for the helper; the transition to
    /// `Relaunching` happens as soon as the spawn succeeds.
    ///
    /// # Errors
    ///
    /// On script-write or spawn failure the engine transitions to
    /// `Terminal(Failed)`, the staged file is removed, and the current
    /// process is left running.
    pub fn start_handoff(&mut self) -> Result<(), LauncherError> {
        self.start_handoff_with(|request, policy| {
            script::write_and_spawn(request, policy).map(|_| ())
        })
    }

    /// [`Self::start_handoff`] with an injectable spawner, for tests.
    pub fn start_handoff_with(
        &mut self,
        spawn: impl FnOnce(&ReplaceRequest, &RetryPolicy) -> Result<(), LauncherError>,
    ) -> Result<(), LauncherError> {
        debug_assert_eq!(self.state, EngineState::Staged);
        self.state = EngineState::AwaitingHandoff;

        match spawn(&self.request, &self.policy) {
            Ok(()) => {
                info!(
                    "handoff started for {}",
                    self.request.destination_path.display()
                );
                self.state = EngineState::Relaunching;
                Ok(())
            }
            Err(e) => {
                self.abandon();
                Err(e)
            }
        }
    }

    /// `Relaunching → Terminal(Success)`: the caller has recorded the new
    /// version and is about to terminate the process.
    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, EngineState::Relaunching);
        self.state = EngineState::Terminal(Outcome::Success);
    }

    /// Abandon the replacement: remove any staged file and mark the run
    /// failed. The current process keeps running.
    pub fn abandon(&mut self) {
        if let Err(e) = fsutil::remove_if_exists(&self.request.staged_path) {
            warn!(
                "could not remove staged file {}: {e}",
                self.request.staged_path.display()
            );
        }
        self.state = EngineState::Terminal(Outcome::Failed);
    }
}
