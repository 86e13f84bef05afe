//! Core types shared across the launcher.
//!
//! This module hosts the error taxonomy and the user-facing error
//! presentation used by the CLI entry point.

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};
