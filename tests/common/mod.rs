//! Shared fixtures for the integration tests.
//!
//! Each integration test binary compiles its own copy of this module and
//! uses a subset of it.
#![allow(dead_code)]

use serde_json::json;
use std::path::Path;
use updraft::config::{ArtifactConfig, ArtifactKind, LauncherConfig};

/// Artifact configuration rooted in a temp dir, pointing at a test
/// server.
pub fn artifact(kind: ArtifactKind, home: &Path, api_url: &str) -> ArtifactConfig {
    let (install, record) = match kind {
        ArtifactKind::App => ("app.AppImage", "installed-app.toml"),
        ArtifactKind::Launcher => ("updraft", "installed-launcher.toml"),
    };
    ArtifactConfig {
        kind,
        api_url: api_url.to_string(),
        asset_extension: ".AppImage".to_string(),
        install_path: home.join(install),
        record_path: home.join(record),
    }
}

/// Full launcher configuration for a temp home; both kinds share the
/// same endpoint.
pub fn launcher_config(home: &Path, api_url: &str) -> LauncherConfig {
    LauncherConfig {
        home_dir: home.to_path_buf(),
        app: artifact(ArtifactKind::App, home, api_url),
        launcher: artifact(ArtifactKind::Launcher, home, api_url),
    }
}

/// A latest-release document with the given tag and asset URLs.
pub fn release_doc(tag: &str, asset_urls: &[&str]) -> serde_json::Value {
    json!({
        "tag_name": tag,
        "name": format!("Release {tag}"),
        "assets": asset_urls
            .iter()
            .map(|url| json!({ "browser_download_url": url, "name": url.rsplit('/').next() }))
            .collect::<Vec<_>>(),
    })
}
