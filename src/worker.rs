//! The single background worker.
//!
//! All network and filesystem work runs on one tokio task, processing
//! queued [`Task`]s strictly in order: never more than one download or
//! install in flight per launcher instance, which is what makes the
//! single-staging-file and record-file invariants hold without locking.
//!
//! The presentation layer enqueues tasks through a [`WorkerHandle`] and
//! consumes published [`Event`]s; it never touches the network or the
//! filesystem itself. Shutdown is cooperative: signalling the handle (or
//! dropping it) interrupts the worker between or during tasks. An
//! interrupted download may leave a staging file behind; those are swept
//! the next time a worker starts.

use crate::config::{ArtifactKind, LauncherConfig};
use crate::constants::STAGING_SUFFIX;
use crate::core::LauncherError;
use crate::download::{DownloadProgress, Downloader};
use crate::install::{self, InstallationRecord};
use crate::release::{Release, ReleaseClient};
use crate::upgrade::{ReplaceRequest, SelfReplaceEngine, engine};
use crate::utils::{fs as fsutil, platform};
use crate::version::is_newer;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Work items the presentation layer may enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Resolve the latest release and report whether it is newer.
    Check(ArtifactKind),
    /// Download and install the latest release if newer (or missing).
    Install(ArtifactKind),
}

/// Events published by the worker, consumed by the presentation layer.
#[derive(Debug)]
pub enum Event {
    /// A release check has started.
    Checking(ArtifactKind),
    /// A release check finished.
    CheckComplete {
        /// Artifact that was checked.
        kind: ArtifactKind,
        /// Locally recorded version (baseline when never installed).
        installed: String,
        /// What the release endpoint reported.
        release: Release,
        /// Whether an install would change anything.
        update_available: bool,
    },
    /// A release check failed; the installed artifact (if any) is
    /// unaffected.
    CheckFailed {
        /// Artifact that was being checked.
        kind: ArtifactKind,
        /// What went wrong.
        error: LauncherError,
    },
    /// A download has started.
    DownloadStarted {
        /// Artifact being downloaded.
        kind: ArtifactKind,
        /// Release tag being fetched.
        version: String,
    },
    /// Bytes moved; emitted once per chunk.
    Progress(DownloadProgress),
    /// An ordinary install finished and was recorded.
    Installed {
        /// Artifact that was installed.
        kind: ArtifactKind,
        /// Version now recorded.
        version: String,
    },
    /// Nothing to do: the installed artifact is already current.
    AlreadyCurrent {
        /// Artifact that was checked.
        kind: ArtifactKind,
        /// Recorded version.
        installed: String,
    },
    /// The latest release carries no matching downloadable asset.
    AssetMissing(ArtifactKind),
    /// The handoff helper is running; the process must exit now so the
    /// helper can replace the executable.
    HandoffStarted {
        /// Version that will be live after relaunch.
        version: String,
    },
    /// An install failed; any partial staging file has been removed.
    InstallFailed {
        /// Artifact that was being installed.
        kind: ArtifactKind,
        /// What went wrong.
        error: LauncherError,
    },
}

/// Handle for enqueueing tasks and requesting shutdown.
pub struct WorkerHandle {
    tasks: mpsc::Sender<Task>,
    shutdown: watch::Sender<bool>,
}

impl WorkerHandle {
    /// Queue a task; it runs after everything queued before it.
    ///
    /// # Errors
    ///
    /// Fails if the worker has already stopped.
    pub async fn enqueue(&self, task: Task) -> Result<(), LauncherError> {
        self.tasks
            .send(task)
            .await
            .map_err(|_| LauncherError::Io(std::io::Error::other("worker stopped")))
    }

    /// Ask the worker to stop; an in-flight task is interrupted
    /// cooperatively.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Start the background worker for this configuration.
///
/// Returns the handle and the event stream. The worker stops when the
/// handle is dropped or when [`WorkerHandle::shutdown`] is called; an
/// in-flight task is abandoned cooperatively.
///
/// # Errors
///
/// Fails when the HTTP clients cannot be built or the install directory
/// cannot be created.
pub fn spawn(config: LauncherConfig) -> Result<(WorkerHandle, mpsc::UnboundedReceiver<Event>), LauncherError> {
    fsutil::ensure_dir(&config.home_dir)
        .map_err(|e| LauncherError::file_system("creating install directory", &config.home_dir, std::io::Error::other(e)))?;
    // Opportunistic cleanup of staging files from interrupted runs.
    fsutil::sweep_extension(&config.home_dir, STAGING_SUFFIX);

    let releases = ReleaseClient::new()?;
    let downloader = Downloader::new()?;

    let (task_tx, mut task_rx) = mpsc::channel::<Task>(16);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let worker = Worker {
        config,
        releases,
        downloader,
        events: event_tx,
    };

    tokio::spawn(async move {
        loop {
            let task = tokio::select! {
                task = task_rx.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
                _ = shutdown_rx.changed() => break,
            };

            debug!("worker picked up {task:?}");
            tokio::select! {
                _ = worker.run(task) => {}
                _ = shutdown_rx.changed() => {
                    info!("worker interrupted mid-task");
                    break;
                }
            }
        }
        debug!("worker stopped");
    });

    Ok((
        WorkerHandle {
            tasks: task_tx,
            shutdown: shutdown_tx,
        },
        event_rx,
    ))
}

struct Worker {
    config: LauncherConfig,
    releases: ReleaseClient,
    downloader: Downloader,
    events: mpsc::UnboundedSender<Event>,
}

impl Worker {
    fn publish(&self, event: Event) {
        // The receiver only disappears when the CLI is going away; the
        // worker keeps finishing its task regardless.
        let _ = self.events.send(event);
    }

    async fn run(&self, task: Task) {
        match task {
            Task::Check(kind) => self.check(kind).await,
            Task::Install(kind) => self.install(kind).await,
        }
    }

    /// Resolve the latest release and decide whether it is an update.
    async fn resolve(&self, kind: ArtifactKind) -> Result<(String, Release, bool), LauncherError> {
        let artifact = self.config.artifact(kind);
        let installed = install::installed_version(&artifact.record_path);
        let release = self.releases.latest(artifact).await?;

        let newer = match &release.tag {
            Some(tag) => is_newer(tag, &installed),
            None => false,
        };
        // A missing artifact is always an install candidate, but only for
        // the managed app: the launcher itself is evidently running.
        let missing = kind == ArtifactKind::App && !artifact.install_path.is_file();
        let update_available = release.is_complete() && (newer || missing);

        Ok((installed, release, update_available))
    }

    async fn check(&self, kind: ArtifactKind) {
        self.publish(Event::Checking(kind));
        match self.resolve(kind).await {
            Ok((installed, release, update_available)) => {
                self.publish(Event::CheckComplete {
                    kind,
                    installed,
                    release,
                    update_available,
                });
            }
            Err(error) => self.publish(Event::CheckFailed { kind, error }),
        }
    }

    async fn install(&self, kind: ArtifactKind) {
        self.publish(Event::Checking(kind));

        let (installed, release, update_available) = match self.resolve(kind).await {
            Ok(resolved) => resolved,
            Err(error) => {
                self.publish(Event::CheckFailed { kind, error });
                return;
            }
        };

        if !release.is_complete() {
            self.publish(Event::AssetMissing(kind));
            return;
        }
        if !update_available {
            self.publish(Event::AlreadyCurrent { kind, installed });
            return;
        }

        // is_complete() checked above.
        let version = release.tag.unwrap_or_default();
        let asset_url = release.asset_url.unwrap_or_default();

        if let Err(error) = self.download_and_install(kind, &version, &asset_url).await {
            self.publish(Event::InstallFailed { kind, error });
        }
    }

    async fn download_and_install(
        &self,
        kind: ArtifactKind,
        version: &str,
        asset_url: &str,
    ) -> Result<(), LauncherError> {
        let artifact = self.config.artifact(kind);
        let staging = artifact.staging_path();

        self.publish(Event::DownloadStarted {
            kind,
            version: version.to_string(),
        });

        let events = self.events.clone();
        let staged = self
            .downloader
            .download(asset_url, &staging, move |progress| {
                let _ = events.send(Event::Progress(progress));
            })
            .await?;

        let record = InstallationRecord {
            version: version.to_string(),
            path: artifact.install_path.clone(),
        };

        if engine::replaces_running_executable(&artifact.install_path) {
            // Self-update: hand the promotion to a detached helper, then
            // tell the presentation layer to exit this process.
            let request = ReplaceRequest::relaunching_destination(
                staged.path.clone(),
                artifact.install_path.clone(),
            );
            let mut engine = SelfReplaceEngine::new(request);
            engine.mark_staged()?;
            engine.start_handoff()?;
            record.save(&artifact.record_path)?;
            engine.complete();

            info!("self-update to {version} handed off");
            self.publish(Event::HandoffStarted {
                version: version.to_string(),
            });
        } else {
            install::promote(&staged.path, &artifact.install_path)?;
            if let Err(e) = platform::set_executable(&artifact.install_path) {
                warn!(
                    "could not mark {} executable: {e}",
                    artifact.install_path.display()
                );
            }
            record.save(&artifact.record_path)?;

            info!("installed {kind} {version}");
            self.publish(Event::Installed {
                kind,
                version: version.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // End-to-end worker behavior is covered by the integration tests
    // against a mock release server; here we pin the queueing contract.

    fn test_config(dir: &std::path::Path) -> LauncherConfig {
        let home = dir.to_path_buf();
        let app = crate::config::ArtifactConfig {
            kind: ArtifactKind::App,
            api_url: "http://127.0.0.1:9/latest".to_string(),
            asset_extension: ".AppImage".to_string(),
            install_path: home.join("app.AppImage"),
            record_path: home.join("installed-app.toml"),
        };
        let launcher = crate::config::ArtifactConfig {
            kind: ArtifactKind::Launcher,
            api_url: "http://127.0.0.1:9/latest".to_string(),
            asset_extension: ".AppImage".to_string(),
            install_path: home.join("updraft"),
            record_path: home.join("installed-launcher.toml"),
        };
        LauncherConfig {
            home_dir: home,
            app,
            launcher,
        }
    }

    #[tokio::test]
    async fn spawn_sweeps_stale_staging_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("app.AppImage.part"), b"stale").unwrap();

        let (handle, _events) = spawn(test_config(tmp.path())).unwrap();
        // The sweep happens before the worker task starts.
        assert!(!tmp.path().join("app.AppImage.part").exists());
        handle.shutdown();
    }

    #[tokio::test]
    async fn check_against_unreachable_endpoint_reports_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (handle, mut events) = spawn(test_config(tmp.path())).unwrap();

        handle.enqueue(Task::Check(ArtifactKind::App)).await.unwrap();

        match events.recv().await.unwrap() {
            Event::Checking(ArtifactKind::App) => {}
            other => panic!("expected Checking, got {other:?}"),
        }
        match events.recv().await.unwrap() {
            Event::CheckFailed {
                kind: ArtifactKind::App,
                error: LauncherError::Network { .. },
            } => {}
            other => panic!("expected network CheckFailed, got {other:?}"),
        }
        handle.shutdown();
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (handle, _events) = spawn(test_config(tmp.path())).unwrap();

        handle.shutdown();
        // Give the worker loop a moment to observe the signal.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(handle.enqueue(Task::Check(ArtifactKind::App)).await.is_err());
    }
}
