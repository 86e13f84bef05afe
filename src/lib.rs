//! updraft, a self-updating application launcher.
//!
//! updraft keeps a managed application current from published releases
//! and can replace its *own* running executable, then relaunch itself.
//! The interesting parts are the update engine and its invariants:
//! installs are atomic (a destination file is only ever written by a
//! rename from a fully-written staging file), no partial artifact is
//! ever visible to the installer, and replacing a locked, in-use binary
//! is handed off to a short-lived detached helper with a bounded retry
//! protocol.
//!
//! # Core Modules
//!
//! - [`version`] - loose release-tag comparison (`is_newer`)
//! - [`release`] - release-metadata resolution into a [`release::Release`]
//! - [`download`] - progress-tracked streaming download to a staging file
//! - [`install`] - installation records and the atomic finalize step
//! - [`upgrade`] - the self-replacement state machine, handoff protocol,
//!   and helper-script generation
//! - [`worker`] - the single strictly-ordered background worker and its
//!   event stream
//!
//! # Supporting Modules
//!
//! - [`cli`] - command-line presentation (consumes worker events)
//! - [`config`] - install locations and release endpoints, env-driven
//! - [`launch`] - detached spawning of the managed application
//! - [`core`] - error taxonomy and user-facing error display
//! - [`constants`] - timeouts, retry budget, filenames
//! - [`utils`] - filesystem, platform, and progress helpers
//!
//! # Update Flow
//!
//! ```text
//! ReleaseResolver ──▶ is_newer? ──▶ Downloader ──▶ staging file
//!                                                      │
//!                  ordinary artifact: atomic rename ◀──┤
//!                  running executable: handoff helper ◀┘
//! ```
//!
//! All of it runs on one background worker task; the CLI only queues
//! work and renders events.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod download;
pub mod install;
pub mod launch;
pub mod release;
pub mod upgrade;
pub mod utils;
pub mod version;
pub mod worker;
