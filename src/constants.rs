//! Global constants used throughout the updraft codebase.
//!
//! This module contains timeout durations, retry parameters, and other
//! numeric constants that are used across multiple modules. Defining
//! them centrally improves maintainability and makes magic numbers
//! more discoverable.

use std::time::Duration;

/// Connect timeout for all HTTP requests (15 seconds).
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Overall timeout for a release-metadata request (20 seconds).
///
/// Release documents are small; anything slower than this is treated
/// as a network failure rather than left to hang the worker.
pub const RELEASE_API_TIMEOUT: Duration = Duration::from_secs(20);

/// Overall timeout for an artifact download request (5 minutes).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum delete/overwrite attempts the handoff helper makes against a
/// locked destination before giving up.
///
/// Operating-system file locks on a running executable clear only after
/// the original process has fully exited; 30 attempts at
/// [`HANDOFF_RETRY_INTERVAL`] gives the old process half a minute to die.
pub const HANDOFF_RETRY_ATTEMPTS: u32 = 30;

/// Fixed delay between handoff retry attempts (1 second).
pub const HANDOFF_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Suffix appended to a destination path to form its staging path.
///
/// Staging files live next to their destination so the finalize rename
/// never crosses a filesystem boundary.
pub const STAGING_SUFFIX: &str = "part";

/// Version reported by unversioned development builds.
///
/// A binary built outside the release pipeline cannot know its own
/// version; it reports this sentinel instead, which compares as
/// never-newer in either direction so such builds never prompt for or
/// offer a self-update.
pub const UNVERSIONED_BUILD: &str = "999.999.999";

/// Comparison baseline when no installation record exists.
pub const NEVER_INSTALLED_VERSION: &str = "0.0.0";

/// `User-Agent` header sent with every HTTP request.
pub const USER_AGENT: &str = concat!("updraft/", env!("CARGO_PKG_VERSION"));
