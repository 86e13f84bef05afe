//! Progress-tracked artifact download.
//!
//! Streams a release asset to a staging file next to its final
//! destination. The destination itself is never touched here; promoting
//! the staged file is the installer's atomic rename. On any mid-stream
//! failure the staging file is deleted before the error propagates, so
//! nothing the installer could see is ever partial.

use crate::constants::{DOWNLOAD_TIMEOUT, HTTP_CONNECT_TIMEOUT, USER_AGENT};
use crate::core::LauncherError;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Byte-level progress of a download in flight.
///
/// Recomputed per chunk, never persisted. `total_bytes` is `-1` when the
/// size probe failed and the total is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written to the staging file so far.
    pub bytes_read: u64,
    /// Total expected bytes, or `-1` when unknown.
    pub total_bytes: i64,
}

impl DownloadProgress {
    /// Completion percentage in `[0, 100]`, or `None` when the total is
    /// unknown.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        if self.total_bytes <= 0 {
            return None;
        }
        let pct = self.bytes_read.saturating_mul(100) / (self.total_bytes as u64).max(1);
        Some(pct.min(100) as u8)
    }
}

/// A fully-written, closed staging file awaiting promotion.
#[derive(Debug)]
pub struct StagedFile {
    /// Path of the staging file.
    pub path: PathBuf,
    /// Total bytes written.
    pub bytes: u64,
}

/// HTTP client for artifact downloads.
pub struct Downloader {
    http: reqwest::Client,
}

impl Downloader {
    /// Build a download client with the launcher's timeouts.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying TLS backend cannot initialize.
    pub fn new() -> Result<Self, LauncherError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| LauncherError::Network {
                operation: "building download client".to_string(),
                source: e,
            })?;
        Ok(Self { http })
    }

    /// Probe the asset's total size with a HEAD request.
    ///
    /// Failure is non-fatal: the download falls back to the GET
    /// response's own Content-Length, and past that to unknown-total
    /// progress (bytes only, no percentage).
    async fn probe_total(&self, url: &str) -> i64 {
        match self.http.head(url).send().await {
            // A HEAD response has no body, so the Content-Length header
            // must be read directly; `content_length()` reports the body
            // size, which is zero here.
            Ok(resp) if resp.status().is_success() => resp
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|len| *len >= 0)
                .unwrap_or(-1),
            Ok(resp) => {
                debug!("size probe answered HTTP {}", resp.status());
                -1
            }
            Err(e) => {
                debug!("size probe failed: {e}");
                -1
            }
        }
    }

    /// Stream `url` into `staging_path`, emitting progress after every
    /// chunk.
    ///
    /// Any stale partial file at `staging_path` is truncated first. When
    /// the total size is known, emitted percentages are monotonically
    /// non-decreasing and the final event reports all bytes read.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::Network`] - request or mid-stream transport
    ///   failure
    /// - [`LauncherError::FileSystem`] - staging file cannot be written
    ///
    /// In every error case the staging file has already been removed.
    pub async fn download(
        &self,
        url: &str,
        staging_path: &Path,
        mut on_progress: impl FnMut(DownloadProgress),
    ) -> Result<StagedFile, LauncherError> {
        let total_bytes = self.probe_total(url).await;
        debug!(
            "downloading {url} -> {} (total: {total_bytes})",
            staging_path.display()
        );

        match self
            .stream_to_staging(url, staging_path, total_bytes, &mut on_progress)
            .await
        {
            Ok(bytes) => Ok(StagedFile {
                path: staging_path.to_path_buf(),
                bytes,
            }),
            Err(e) => {
                if let Err(cleanup) = crate::utils::fs::remove_if_exists(staging_path) {
                    warn!(
                        "could not remove partial staging file {}: {cleanup}",
                        staging_path.display()
                    );
                }
                Err(e)
            }
        }
    }

    async fn stream_to_staging(
        &self,
        url: &str,
        staging_path: &Path,
        mut total_bytes: i64,
        on_progress: &mut impl FnMut(DownloadProgress),
    ) -> Result<u64, LauncherError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| LauncherError::Network {
                operation: "requesting artifact download".to_string(),
                source: e,
            })?;

        // A failed probe can still be rescued by the GET response's own
        // Content-Length; chunked responses stay in unknown-total mode.
        if total_bytes < 0 {
            total_bytes = response
                .content_length()
                .and_then(|len| i64::try_from(len).ok())
                .unwrap_or(-1);
        }

        // Truncates any stale partial file from an interrupted run.
        let mut file = tokio::fs::File::create(staging_path)
            .await
            .map_err(|e| LauncherError::file_system("creating staging file", staging_path, e))?;

        let mut bytes_read: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LauncherError::Network {
                operation: "streaming artifact download".to_string(),
                source: e,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::file_system("writing staging file", staging_path, e))?;

            bytes_read += chunk.len() as u64;
            on_progress(DownloadProgress {
                bytes_read,
                total_bytes,
            });
        }

        file.sync_all()
            .await
            .map_err(|e| LauncherError::file_system("syncing staging file", staging_path, e))?;
        drop(file);

        debug!("download complete: {bytes_read} bytes staged");
        Ok(bytes_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_none_when_total_unknown() {
        let progress = DownloadProgress {
            bytes_read: 1024,
            total_bytes: -1,
        };
        assert_eq!(progress.percent(), None);

        let progress = DownloadProgress {
            bytes_read: 0,
            total_bytes: 0,
        };
        assert_eq!(progress.percent(), None);
    }

    #[test]
    fn percent_tracks_completion() {
        let total = 200;
        for (read, expected) in [(0, 0), (50, 25), (100, 50), (200, 100)] {
            let progress = DownloadProgress {
                bytes_read: read,
                total_bytes: total,
            };
            assert_eq!(progress.percent(), Some(expected));
        }
    }

    #[test]
    fn percent_is_clamped_to_100() {
        // A server that sends more bytes than its probe reported.
        let progress = DownloadProgress {
            bytes_read: 500,
            total_bytes: 200,
        };
        assert_eq!(progress.percent(), Some(100));
    }
}
