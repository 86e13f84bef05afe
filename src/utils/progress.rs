//! Progress reporting built on `indicatif`.
//!
//! A thin wrapper that keeps styling in one place and honors the
//! `UPDRAFT_NO_PROGRESS` environment variable so automation gets clean
//! output.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

fn is_progress_disabled() -> bool {
    std::env::var("UPDRAFT_NO_PROGRESS").is_ok()
}

fn percent_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {percent:>3}% ({bytes}/{total_bytes})")
        .unwrap()
        .progress_chars("━╸━")
}

fn bytes_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner} {bytes} downloaded")
        .unwrap()
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner} {msg}")
        .unwrap()
}

/// Progress display for a single worker flow.
///
/// Starts as a spinner and switches to a percentage bar or a byte counter
/// once the download's total size (or lack of one) is known.
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a spinner with a prefix label.
    #[must_use]
    pub fn spinner(prefix: &str) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        bar.set_prefix(prefix.to_string());
        Self { inner: bar }
    }

    /// Switch to a determinate percentage bar over `total` bytes.
    pub fn begin_bytes(&self, total: u64) {
        self.inner.disable_steady_tick();
        self.inner.set_style(percent_style());
        self.inner.set_length(total);
        self.inner.set_position(0);
    }

    /// Switch to an indeterminate byte counter (total size unknown).
    pub fn begin_unknown(&self) {
        self.inner.set_style(bytes_style());
        self.inner.set_position(0);
    }

    /// Update the number of bytes read so far.
    pub fn set_bytes(&self, bytes: u64) {
        self.inner.set_position(bytes);
    }

    /// Update the spinner message.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Finish, leaving a final message on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Finish and remove the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_build_without_panicking() {
        let _ = percent_style();
        let _ = bytes_style();
        let _ = spinner_style();
    }

    #[test]
    fn bar_transitions_do_not_panic() {
        let bar = ProgressBar::spinner("test");
        bar.set_message("checking");
        bar.begin_bytes(100);
        bar.set_bytes(50);
        bar.begin_unknown();
        bar.set_bytes(75);
        bar.finish_and_clear();
    }
}
