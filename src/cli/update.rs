//! Update the managed application without launching it.

use super::common::{self, CheckOutcome, InstallOutcome};
use crate::config::{ArtifactKind, LauncherConfig};
use crate::core::LauncherError;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Check for an update without installing it.
    #[arg(long)]
    pub check: bool,
}

/// Execute the update command.
pub async fn execute(args: UpdateArgs) -> Result<()> {
    let config = LauncherConfig::from_env()?;
    let (handle, mut events) = common::start_worker(config)?;

    if args.check {
        let outcome = common::run_check(&handle, &mut events, ArtifactKind::App).await?;
        handle.shutdown();
        return report_check(outcome);
    }

    let outcome = common::run_install(&handle, &mut events, ArtifactKind::App).await?;
    handle.shutdown();

    match outcome {
        InstallOutcome::Installed(version) => {
            println!("{}", format!("Installed application {version}").green());
            Ok(())
        }
        InstallOutcome::AlreadyCurrent(version) => {
            println!(
                "{}",
                format!("Application is up to date ({version})").green()
            );
            Ok(())
        }
        InstallOutcome::AssetMissing => Err(LauncherError::MissingAsset {
            artifact: "app".to_string(),
        }
        .into()),
        InstallOutcome::CheckFailed(error) | InstallOutcome::Failed(error) => Err(error.into()),
        InstallOutcome::HandoffStarted(_) => {
            unreachable!("app install cannot hand off the launcher executable")
        }
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
                    format!("Update available: {installed} -> {tag}").green()
                );
                println!("Run `updraft update` to install it");
            } else if release.is_complete() {
                println!("{}", format!("Application is up to date ({installed})").green());
            } else {
                println!("No downloadable release found; installed version is {installed}");
            }
            Ok(())
        }
        CheckOutcome::Failed(error) => {
            Err(anyhow::Error::new(error).context("Failed to check for updates"))
        }
    }
}
