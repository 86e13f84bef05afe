//! Error handling for updraft.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`LauncherError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! Failures that are part of normal operation are *not* errors here: a
//! release document without a matching asset degrades to "no update
//! available", and an unreadable installation record degrades to "never
//! installed". Only conditions that stop an operation surface as
//! [`LauncherError`] values.
//!
//! Use [`user_friendly_error`] at the binary entry point to convert any
//! failure into a colored report with a suggestion.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for launcher operations.
///
/// Variants follow the failure taxonomy of the update engine: network
/// transport, API status, filesystem, the handoff retry budget, and
/// process launch. Parse problems deliberately have no variant: absent
/// release fields degrade to an empty [`Release`](crate::release::Release)
/// instead of failing the caller.
#[derive(Error, Debug)]
pub enum LauncherError {
    /// Network transport failure: unreachable host, timeout, DNS.
    #[error("Network error during {operation}")]
    Network {
        /// Description of what was being attempted.
        operation: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The release endpoint answered with a non-success status.
    #[error("Release API returned HTTP {status}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The latest release has no asset matching the expected extension.
    #[error("No downloadable asset found for '{artifact}'")]
    MissingAsset {
        /// Human-readable artifact name.
        artifact: String,
    },

    /// Filesystem failure: disk full, permission denied, locked file.
    #[error("File system error: {operation}")]
    FileSystem {
        /// Description of the failed operation.
        operation: String,
        /// Path involved, when known.
        path: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The handoff helper exhausted its retry budget waiting for a locked
    /// destination to free. The old executable remains authoritative.
    #[error("Gave up waiting for locked destination after {attempts} attempts")]
    HandoffTimeout {
        /// Number of delete/overwrite attempts made.
        attempts: u32,
    },

    /// The per-user home directory could not be determined.
    #[error("Unable to determine home directory")]
    HomeDirNotFound,

    /// The managed artifact is not installed yet.
    #[error("'{artifact}' is not installed")]
    NotInstalled {
        /// Human-readable artifact name.
        artifact: String,
    },

    /// Spawning an external process failed.
    #[error("Failed to launch {program}")]
    LaunchFailed {
        /// Program that could not be started.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper for [`std::io::Error`].
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LauncherError {
    /// Build a [`LauncherError::FileSystem`] with operation context.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: Some(path.into()),
            source,
        }
    }
}

/// An error paired with user-facing guidance.
///
/// Wraps any error with an optional suggestion and detail line, rendered
/// in color on stderr by [`ErrorContext::display`]. Created manually or
/// via [`user_friendly_error`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error.
    pub error: anyhow::Error,
    /// Actionable next step for the user.
    pub suggestion: Option<String>,
    /// Extra context shown below the suggestion.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no guidance attached.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a detail line.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, suggestion, and details to stderr in color.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);

        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("\n{} {}", "hint:".cyan().bold(), suggestion);
        }

        if let Some(details) = &self.details {
            eprintln!("{}", details.dimmed());
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nhint: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a matched suggestion.
///
/// Downcasts to [`LauncherError`] where possible and attaches the
/// suggestion appropriate for that failure class; other errors pass
/// through without guidance.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<LauncherError>() {
        Some(LauncherError::Network { .. }) => Some(
            "Check your internet connection. If you are behind a proxy, \
             make sure HTTPS_PROXY is set."
                .to_string(),
        ),
        Some(LauncherError::Api { status: 403 | 429 }) => Some(
            "The release API rate limit may be exhausted. Set GITHUB_TOKEN \
             to authenticate and raise the limit."
                .to_string(),
        ),
        Some(LauncherError::Api { .. }) => {
            Some("The release endpoint may be temporarily unavailable. Try again later.".to_string())
        }
        Some(LauncherError::MissingAsset { .. }) => Some(
            "The latest release may still be uploading its assets. Try again in a few minutes."
                .to_string(),
        ),
        Some(LauncherError::FileSystem { .. } | LauncherError::Io(_)) => {
            Some("Check free disk space and file permissions in the install directory.".to_string())
        }
        Some(LauncherError::HandoffTimeout { .. }) => Some(
            "The previous executable is still running. Close it and run the upgrade again."
                .to_string(),
        ),
        Some(LauncherError::NotInstalled { .. }) => {
            Some("Run `updraft update` to install it first.".to_string())
        }
        Some(LauncherError::HomeDirNotFound) => {
            Some("Set the UPDRAFT_HOME environment variable to a writable directory.".to_string())
        }
        Some(LauncherError::LaunchFailed { .. }) => {
            Some("Verify the installed file exists and is executable.".to_string())
        }
        None => None,
    };

    let ctx = ErrorContext::new(error);
    match suggestion {
        Some(s) => ctx.with_suggestion(s),
        None => ctx,
    }
}
