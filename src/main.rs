//! updraft CLI entry point.
//!
//! Parses arguments, wires up logging, runs the selected command, and
//! converts any failure into a user-friendly report before exiting
//! non-zero.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use updraft::cli::Cli;
use updraft::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags when set.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .or_else(|| cli.log_filter().map(EnvFilter::new));
    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    cli.apply_to_env();

    // Colored output needs the virtual terminal enabled on Windows.
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
