//! Shared command plumbing: drive the worker, render its events.

use crate::config::{ArtifactKind, LauncherConfig};
use crate::core::LauncherError;
use crate::release::Release;
use crate::utils::progress::ProgressBar;
use crate::worker::{self, Event, Task, WorkerHandle};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

/// Result of a check flow.
#[derive(Debug)]
pub enum CheckOutcome {
    /// The endpoint answered.
    Resolved {
        /// Recorded local version.
        installed: String,
        /// What the endpoint reported.
        release: Release,
        /// Whether an install would change anything.
        update_available: bool,
    },
    /// The endpoint could not be reached or answered badly.
    Failed(LauncherError),
}

/// Result of an install flow.
#[derive(Debug)]
pub enum InstallOutcome {
    /// A new version was installed and recorded.
    Installed(String),
    /// Nothing to do.
    AlreadyCurrent(String),
    /// The latest release has no matching asset.
    AssetMissing,
    /// Self-replacement handed off; the process must exit now.
    HandoffStarted(String),
    /// The release check failed before anything was downloaded.
    CheckFailed(LauncherError),
    /// The download or install failed.
    Failed(LauncherError),
}

/// Start a worker for this configuration.
pub fn start_worker(
    config: LauncherConfig,
) -> Result<(WorkerHandle, mpsc::UnboundedReceiver<Event>)> {
    Ok(worker::spawn(config)?)
}

/// Run a check task to completion, rendering a spinner.
pub async fn run_check(
    handle: &WorkerHandle,
    events: &mut mpsc::UnboundedReceiver<Event>,
    kind: ArtifactKind,
) -> Result<CheckOutcome> {
    handle.enqueue(Task::Check(kind)).await?;

    let bar = ProgressBar::spinner(&kind.to_string());
    loop {
        let Some(event) = next_event(handle, events).await else {
            anyhow::bail!("interrupted before the task finished");
        };
        match event {
            Event::Checking(_) => bar.set_message("checking for updates..."),
            Event::CheckComplete {
                installed,
                release,
                update_available,
                ..
            } => {
                bar.finish_and_clear();
                return Ok(CheckOutcome::Resolved {
                    installed,
                    release,
                    update_available,
                });
            }
            Event::CheckFailed { error, .. } => {
                bar.finish_and_clear();
                return Ok(CheckOutcome::Failed(error));
            }
            other => debug!("ignoring event during check: {other:?}"),
        }
    }
}

/// Run an install task to completion, rendering check and download
/// progress.
pub async fn run_install(
    handle: &WorkerHandle,
    events: &mut mpsc::UnboundedReceiver<Event>,
    kind: ArtifactKind,
) -> Result<InstallOutcome> {
    handle.enqueue(Task::Install(kind)).await?;

    let bar = ProgressBar::spinner(&kind.to_string());
    let mut sized = false;
    loop {
        let Some(event) = next_event(handle, events).await else {
            anyhow::bail!("interrupted before the task finished");
        };
        match event {
            Event::Checking(_) => bar.set_message("checking for updates..."),
            Event::DownloadStarted { version, .. } => {
                bar.set_message(format!("downloading {version}..."));
            }
            Event::Progress(progress) => {
                if !sized {
                    if progress.total_bytes > 0 {
                        bar.begin_bytes(progress.total_bytes as u64);
                    } else {
                        bar.begin_unknown();
                    }
                    sized = true;
                }
                bar.set_bytes(progress.bytes_read);
            }
            Event::Installed { version, .. } => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::Installed(version));
            }
            Event::AlreadyCurrent { installed, .. } => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::AlreadyCurrent(installed));
            }
            Event::AssetMissing(_) => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::AssetMissing);
            }
            Event::HandoffStarted { version } => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::HandoffStarted(version));
            }
            Event::CheckFailed { error, .. } => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::CheckFailed(error));
            }
            Event::InstallFailed { error, .. } => {
                bar.finish_and_clear();
                return Ok(InstallOutcome::Failed(error));
            }
            other => debug!("ignoring event during install: {other:?}"),
        }
    }
}

/// Wait for the next worker event, shutting the worker down cleanly if
/// the user hits Ctrl-C.
async fn next_event(
    handle: &WorkerHandle,
    events: &mut mpsc::UnboundedReceiver<Event>,
) -> Option<Event> {
    tokio::select! {
        event = events.recv() => event,
        _ = tokio::signal::ctrl_c() => {
            handle.shutdown();
            None
        }
    }
}
