//! Command-line interface.
//!
//! The CLI is a thin presentation layer: commands enqueue work on the
//! background worker and render the events it publishes. Nothing in this
//! module touches the network or the install directory directly.

pub mod common;
pub mod launch;
pub mod status;
pub mod update;
pub mod upgrade;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Top-level CLI for the updraft launcher.
#[derive(Parser)]
#[command(
    name = "updraft",
    about = "Keeps a managed application current and launches it",
    version,
    long_about = "updraft checks published releases for a managed application \
                  (and for itself), installs updates atomically, and starts the \
                  application. Run with no subcommand to update-and-launch."
)]
pub struct Cli {
    /// Subcommand; defaults to `launch` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug-level output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress animations (useful for logs and CI).
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Update the managed application if needed, then start it.
    Launch(launch::LaunchArgs),
    /// Show installed and latest versions.
    Status(status::StatusArgs),
    /// Download and install the latest application release.
    Update(update::UpdateArgs),
    /// Self-update the launcher executable.
    Upgrade(upgrade::UpgradeArgs),
}

impl Cli {
    /// Tracing filter directive for the chosen verbosity, `None` when
    /// quiet.
    #[must_use]
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.quiet {
            None
        } else if self.verbose {
            Some("updraft=debug")
        } else {
            Some("updraft=info")
        }
    }

    /// Apply flag-driven settings to the process environment.
    pub fn apply_to_env(&self) {
        if self.no_progress || self.quiet {
            // Safety: runs during startup, before anything reads the
            // environment concurrently.
            unsafe { std::env::set_var("UPDRAFT_NO_PROGRESS", "1") };
        }
    }

    /// Execute the selected command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            None => launch::execute(launch::LaunchArgs::default()).await,
            Some(Commands::Launch(args)) => launch::execute(args).await,
            Some(Commands::Status(args)) => status::execute(args).await,
            Some(Commands::Update(args)) => update::execute(args).await,
            Some(Commands::Upgrade(args)) => upgrade::execute(args).await,
        }
    }
}
