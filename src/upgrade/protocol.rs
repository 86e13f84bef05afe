//! The handoff protocol, single-sourced.
//!
//! Both the generated helper scripts and the test suite follow the same
//! sequence, specified here once:
//!
//! 1. Attempt to clear (delete/overwrite) the destination; on failure,
//!    sleep a fixed interval and retry, up to a bounded budget.
//! 2. Move the staged file into the destination (atomic same-filesystem
//!    rename).
//! 3. Relaunch the destination executable, detached.
//! 4. Remove the helper itself.
//!
//! [`run`] executes the sequence against a [`DestinationOps`]
//! implementation, which lets tests simulate a destination that stays
//! locked for any number of attempts. The script renderer
//! ([`super::script`]) emits the same sequence as shell/batch text.

use crate::constants::{HANDOFF_RETRY_ATTEMPTS, HANDOFF_RETRY_INTERVAL};
use crate::core::LauncherError;
use std::time::Duration;
use tracing::debug;

/// Bounded fixed-delay retry configuration for the locked-destination
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum clear attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: HANDOFF_RETRY_ATTEMPTS,
            interval: HANDOFF_RETRY_INTERVAL,
        }
    }
}

/// The operations the protocol performs on its surroundings.
///
/// The production implementation is the generated helper script; this
/// trait exists so the protocol itself can be exercised in-process.
pub trait DestinationOps {
    /// Delete or otherwise free the destination path. Fails while the
    /// old executable still holds its file lock.
    fn clear_destination(&mut self) -> std::io::Result<()>;

    /// Move the staged file into the now-free destination.
    fn promote_staged(&mut self) -> std::io::Result<()>;

    /// Start the new executable, detached from the helper's lifetime.
    fn relaunch(&mut self) -> std::io::Result<()>;

    /// Remove the helper itself. Best-effort; failures are ignored.
    fn remove_helper(&mut self) {}
}

/// Execute the handoff protocol.
///
/// `sleep` is injected so tests run without real delays. Returns the
/// number of clear attempts that were needed.
///
/// # Errors
///
/// - [`LauncherError::HandoffTimeout`] - the destination never freed
///   within the budget; it has not been touched beyond the failed delete
///   attempts and the staged file is still in place.
/// - [`LauncherError::Io`] - the move or relaunch step failed after the
///   destination was cleared.
pub fn run(
    ops: &mut dyn DestinationOps,
    policy: &RetryPolicy,
    mut sleep: impl FnMut(Duration),
) -> Result<u32, LauncherError> {
    let mut cleared_after = None;
    for attempt in 1..=policy.max_attempts {
        match ops.clear_destination() {
            Ok(()) => {
                cleared_after = Some(attempt);
                break;
            }
            Err(e) => {
                debug!("destination still locked (attempt {attempt}): {e}");
                if attempt < policy.max_attempts {
                    sleep(policy.interval);
                }
            }
        }
    }

    let Some(attempts) = cleared_after else {
        return Err(LauncherError::HandoffTimeout {
            attempts: policy.max_attempts,
        });
    };

    ops.promote_staged()?;
    ops.relaunch()?;
    ops.remove_helper();
    Ok(attempts)
}
