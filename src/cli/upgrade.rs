//! Self-update of the launcher executable.
//!
//! When the running binary is the installed launcher, a successful
//! update ends with the handoff helper running and this process exiting
//! deliberately: that exit is what frees the executable's file lock so
//! the helper can finish the swap and relaunch the new version.

use super::common::{self, CheckOutcome, InstallOutcome};
use crate::config::{ArtifactKind, LauncherConfig};
use crate::core::LauncherError;
use crate::launch::spawn_detached;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;

/// Arguments for the `upgrade` command.
#[derive(Parser, Debug)]
pub struct UpgradeArgs {
    /// Check for a launcher update without installing it.
    #[arg(long)]
    pub check: bool,
}

/// Execute the upgrade command.
pub async fn execute(args: UpgradeArgs) -> Result<()> {
    let config = LauncherConfig::from_env()?;
    let (handle, mut events) = common::start_worker(config.clone())?;

    if args.check {
        let outcome = common::run_check(&handle, &mut events, ArtifactKind::Launcher).await?;
        handle.shutdown();
        return report_check(outcome);
    }

    println!("{}", "Upgrading launcher...".cyan());
    let outcome = common::run_install(&handle, &mut events, ArtifactKind::Launcher).await?;
    handle.shutdown();

    match outcome {
        InstallOutcome::HandoffStarted(version) => {
            println!(
                "{}",
                format!("Restarting as {version}; this process will now exit.").green()
            );
            // Deliberate termination: the helper's retry loop is waiting
            // for this executable's file lock to clear.
            std::process::exit(0);
        }
        InstallOutcome::Installed(version) => {
            // The running binary is not the installed launcher (for
            // example a development build); the install was an ordinary
            // atomic move. Start the updated launcher and step aside.
            println!("{}", format!("Installed launcher {version}").green());
            spawn_detached(&config.launcher.install_path, &[], &config.home_dir)?;
            std::process::exit(0);
        }
        InstallOutcome::AlreadyCurrent(version) => {
            println!(
                "{}",
                format!("Launcher is up to date ({version})").green()
            );
            Ok(())
        }
        InstallOutcome::AssetMissing => Err(LauncherError::MissingAsset {
            artifact: "launcher".to_string(),
        }
        .into()),
        InstallOutcome::CheckFailed(error) | InstallOutcome::Failed(error) => Err(error.into()),
    }
}

fn report_check(outcome: CheckOutcome) -> Result<()> {
    match outcome {
        CheckOutcome::Resolved {
            installed,
            release,
            update_available,
        } => {
            if update_available {
                let tag = release.tag.as_deref().unwrap_or("?");
                println!(
                    "{}",
                    format!("Launcher update available: {installed} -> {tag}").green()
                );
                println!("Run `updraft upgrade` to install it");
            } else {
                println!(
                    "{}",
                    format!("Launcher is up to date ({installed})").green()
                );
            }
            Ok(())
        }
        CheckOutcome::Failed(error) => {
            Err(anyhow::Error::new(error).context("Failed to check for launcher updates"))
        }
    }
}
