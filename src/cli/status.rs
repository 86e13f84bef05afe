//! Version status for both artifact kinds.

use super::common::{self, CheckOutcome};
use crate::config::{ArtifactKind, LauncherConfig};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {}

/// Execute the status command.
///
/// Runs one check per artifact kind through the same worker; the two
/// checks are queued and therefore strictly ordered.
pub async fn execute(_args: StatusArgs) -> Result<()> {
    let config = LauncherConfig::from_env()?;
    let (handle, mut events) = common::start_worker(config)?;

    println!("updraft {}", env!("CARGO_PKG_VERSION"));

    for kind in [ArtifactKind::App, ArtifactKind::Launcher] {
        let outcome = common::run_check(&handle, &mut events, kind).await?;
        print_line(kind, &outcome);
    }

    handle.shutdown();
    Ok(())
}

fn print_line(kind: ArtifactKind, outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Resolved {
            installed,
            release,
            update_available,
        } => {
            let latest = release.tag.as_deref().unwrap_or("unknown");
            if *update_available {
                println!(
                    "{kind:>9}: {installed} -> {} {}",
                    latest,
                    "(update available)".yellow()
                );
            } else {
                println!("{kind:>9}: {installed} {}", "(up to date)".green());
            }
        }
        CheckOutcome::Failed(error) => {
            println!("{kind:>9}: {}", format!("check failed: {error}").red());
        }
    }
}
