//! Release-metadata resolution.
//!
//! Fetches the latest-release document for an artifact and reduces it to
//! a [`Release`]: the tag plus the first downloadable asset matching the
//! artifact's expected extension. Missing fields degrade to `None` so
//! callers can report "no asset found" instead of failing.

use crate::config::{ArtifactConfig, auth_token};
use crate::constants::{HTTP_CONNECT_TIMEOUT, RELEASE_API_TIMEOUT, USER_AGENT};
use crate::core::LauncherError;
use serde::Deserialize;
use tracing::{debug, warn};

/// One resolved release: immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Release tag (e.g. `v1.4.0`), absent when the document carried none.
    pub tag: Option<String>,
    /// Download URL of the first matching asset, absent when none matched.
    pub asset_url: Option<String>,
}

impl Release {
    /// `true` when both a tag and a downloadable asset were found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tag.is_some() && self.asset_url.is_some()
    }
}

/// Minimal typed view of a latest-release document.
///
/// Only the fields the launcher consumes are modeled; everything else in
/// the document is ignored by serde.
#[derive(Debug, Deserialize)]
struct ReleaseDoc {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<AssetDoc>,
}

#[derive(Debug, Deserialize)]
struct AssetDoc {
    browser_download_url: Option<String>,
}

/// HTTP client for release-metadata requests.
pub struct ReleaseClient {
    http: reqwest::Client,
}

impl ReleaseClient {
    /// Build a client with the launcher's standard timeouts and
    /// user-agent.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying TLS backend cannot initialize.
    pub fn new() -> Result<Self, LauncherError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(RELEASE_API_TIMEOUT)
            .build()
            .map_err(|e| LauncherError::Network {
                operation: "building HTTP client".to_string(),
                source: e,
            })?;
        Ok(Self { http })
    }

    /// Resolve the latest release for an artifact.
    ///
    /// Sends one authenticated (when [`auth_token`] yields one) GET to the
    /// artifact's metadata endpoint. No internal retries; retry policy
    /// belongs to the caller.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::Network`] - transport failure or timeout
    /// - [`LauncherError::Api`] - non-success response status
    ///
    /// A well-formed response with missing fields is *not* an error; the
    /// returned [`Release`] simply has absent fields.
    pub async fn latest(&self, artifact: &ArtifactConfig) -> Result<Release, LauncherError> {
        debug!("checking latest {} release at {}", artifact.kind, artifact.api_url);

        let mut request = self.http.get(&artifact.api_url);
        if let Some(token) = auth_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| LauncherError::Network {
            operation: format!("fetching release metadata for {}", artifact.kind),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::Api {
                status: status.as_u16(),
            });
        }

        let doc: ReleaseDoc = match response.json().await {
            Ok(doc) => doc,
            Err(e) => {
                // A garbled body is treated like a document with no usable
                // fields, not a hard failure.
                warn!("unparseable release document for {}: {e}", artifact.kind);
                return Ok(Release {
                    tag: None,
                    asset_url: None,
                });
            }
        };

        let release = reduce(doc, &artifact.asset_extension);
        debug!(
            "latest {} release: tag={:?} asset={:?}",
            artifact.kind, release.tag, release.asset_url
        );
        Ok(release)
    }
}

/// Reduce a release document to the launcher's view.
///
/// Asset selection is strict first-match: asset URLs are scanned in
/// document order and the first one ending with `extension` wins,
/// regardless of anything else about the asset.
fn reduce(doc: ReleaseDoc, extension: &str) -> Release {
    let asset_url = doc
        .assets
        .into_iter()
        .filter_map(|a| a.browser_download_url)
        .find(|url| url.ends_with(extension));

    Release {
        tag: doc.tag_name,
        asset_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tag: Option<&str>, urls: &[&str]) -> ReleaseDoc {
        ReleaseDoc {
            tag_name: tag.map(str::to_string),
            assets: urls
                .iter()
                .map(|u| AssetDoc {
                    browser_download_url: Some((*u).to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn first_matching_asset_wins() {
        let release = reduce(
            doc(
                Some("v1.0.0"),
                &[
                    "https://example.com/source.zip",
                    "https://example.com/game.AppImage",
                    "https://example.com/other.AppImage",
                ],
            ),
            ".AppImage",
        );
        assert_eq!(
            release.asset_url.as_deref(),
            Some("https://example.com/game.AppImage")
        );
    }

    #[test]
    fn no_matching_asset_degrades_to_none() {
        let release = reduce(doc(Some("v1.0.0"), &["https://example.com/source.zip"]), ".AppImage");
        assert_eq!(release.tag.as_deref(), Some("v1.0.0"));
        assert!(release.asset_url.is_none());
        assert!(!release.is_complete());
    }

    #[test]
    fn missing_tag_degrades_to_none() {
        let release = reduce(doc(None, &["https://example.com/a.AppImage"]), ".AppImage");
        assert!(release.tag.is_none());
        assert!(release.asset_url.is_some());
        assert!(!release.is_complete());
    }

    #[test]
    fn empty_document_yields_empty_release() {
        let release = reduce(doc(None, &[]), ".AppImage");
        assert_eq!(
            release,
            Release {
                tag: None,
                asset_url: None
            }
        );
    }

    #[test]
    fn assets_without_urls_are_skipped() {
        let doc = ReleaseDoc {
            tag_name: Some("v2".to_string()),
            assets: vec![
                AssetDoc {
                    browser_download_url: None,
                },
                AssetDoc {
                    browser_download_url: Some("https://example.com/b.AppImage".to_string()),
                },
            ],
        };
        let release = reduce(doc, ".AppImage");
        assert_eq!(
            release.asset_url.as_deref(),
            Some("https://example.com/b.AppImage")
        );
    }
}
