//! The default update-and-launch flow.
//!
//! Mirrors what a user expects from a launcher: make sure the installed
//! application is current, then start it and get out of the way. A
//! failed release check is not fatal; an already-installed application
//! still launches offline.

use super::common::{self, InstallOutcome};
use crate::config::{ArtifactKind, LauncherConfig};
use crate::core::LauncherError;
use crate::launch::spawn_detached;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::warn;

/// Arguments for the `launch` command.
#[derive(Parser, Debug, Default)]
pub struct LaunchArgs {
    /// Skip the update check and start whatever is installed.
    #[arg(long)]
    pub offline: bool,

    /// Arguments forwarded to the application.
    #[arg(trailing_var_arg = true)]
    pub app_args: Vec<String>,
}

/// Execute the launch flow: update if needed, then spawn and exit.
pub async fn execute(args: LaunchArgs) -> Result<()> {
    let config = LauncherConfig::from_env()?;

    if !args.offline {
        update_if_needed(&config).await?;
    }

    let app = &config.app;
    if !app.install_path.is_file() {
        return Err(LauncherError::NotInstalled {
            artifact: "app".to_string(),
        }
        .into());
    }

    println!("{}", "Starting application...".cyan());
    spawn_detached(&app.install_path, &args.app_args, &config.home_dir)?;

    // The launcher's job is done; the application owns the terminal now.
    Ok(())
}

/// Install the latest application release when one is available,
/// degrading to an offline launch when the check fails.
async fn update_if_needed(config: &LauncherConfig) -> Result<()> {
    let (handle, mut events) = common::start_worker(config.clone())?;
    let outcome = common::run_install(&handle, &mut events, ArtifactKind::App).await?;
    handle.shutdown();

    let installed = config.app.install_path.is_file();
    match outcome {
        InstallOutcome::Installed(version) => {
            println!("{}", format!("Installed application {version}").green());
            Ok(())
        }
        InstallOutcome::AlreadyCurrent(version) => {
            println!("Application {version} is up to date");
            Ok(())
        }
        InstallOutcome::AssetMissing if installed => {
            warn!("latest release has no downloadable asset; launching installed version");
            Ok(())
        }
        InstallOutcome::AssetMissing => Err(LauncherError::MissingAsset {
            artifact: "app".to_string(),
        }
        .into()),
        InstallOutcome::CheckFailed(error) if installed => {
            // Offline launch with whatever is installed.
            warn!("release check failed ({error}); launching installed version");
            println!(
                "{}",
                "Could not check for updates; starting installed version.".yellow()
            );
            Ok(())
        }
        InstallOutcome::CheckFailed(error) => Err(error.into()),
        InstallOutcome::Failed(error) => Err(error.into()),
        InstallOutcome::HandoffStarted(_) => {
            // Installing the app can never replace the running launcher.
            unreachable!("app install cannot hand off the launcher executable")
        }
    }
}
