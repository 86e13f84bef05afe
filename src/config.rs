//! Launcher configuration.
//!
//! There is no configuration file: everything is derived from compiled-in
//! defaults plus a handful of environment variables, which keeps the
//! launcher runnable with zero setup.
//!
//! | Variable | Effect |
//! |---|---|
//! | `UPDRAFT_HOME` | overrides the install directory (default `~/.updraft`) |
//! | `UPDRAFT_APP_REPO` | `owner/name` repository of the managed application |
//! | `UPDRAFT_LAUNCHER_REPO` | `owner/name` repository of the launcher itself |
//! | `UPDRAFT_APP_API_URL` | full release-metadata URL, overriding the repo (testing) |
//! | `UPDRAFT_LAUNCHER_API_URL` | full release-metadata URL, overriding the repo (testing) |
//! | `GITHUB_TOKEN` | optional bearer token for release API requests |

use crate::core::LauncherError;
use crate::utils::platform;
use std::fmt;
use std::path::PathBuf;

/// Default repository of the managed application.
const DEFAULT_APP_REPO: &str = "lhama-tools/skylark";

/// Default repository of the launcher itself.
const DEFAULT_LAUNCHER_REPO: &str = "lhama-tools/updraft";

/// Which of the two independently-updated artifacts is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The managed application.
    App,
    /// The launcher's own executable.
    Launcher,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App => write!(f, "app"),
            Self::Launcher => write!(f, "launcher"),
        }
    }
}

/// Everything the update engine needs to know about one artifact kind.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Which artifact this describes.
    pub kind: ArtifactKind,
    /// Release-metadata endpoint (latest-release document).
    pub api_url: String,
    /// Extension a downloadable asset URL must end with to be selected.
    pub asset_extension: String,
    /// Final installed location of the artifact.
    pub install_path: PathBuf,
    /// Location of this artifact's installation record.
    pub record_path: PathBuf,
}

impl ArtifactConfig {
    /// Deterministic staging path: a `.part` sibling of the destination.
    ///
    /// Keeping it next to the destination means there is exactly one
    /// staging file per artifact kind and the finalize rename never
    /// crosses filesystems.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .install_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(crate::constants::STAGING_SUFFIX);
        self.install_path.with_file_name(name)
    }
}

/// Resolved launcher configuration for both artifact kinds.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Per-user install directory holding artifacts and records.
    pub home_dir: PathBuf,
    /// The managed application.
    pub app: ArtifactConfig,
    /// The launcher itself.
    pub launcher: ArtifactConfig,
}

impl LauncherConfig {
    /// Build the configuration from defaults and environment overrides.
    ///
    /// # Errors
    ///
    /// Fails with [`LauncherError::HomeDirNotFound`] when neither
    /// `UPDRAFT_HOME` nor the platform home directory can be resolved.
    pub fn from_env() -> Result<Self, LauncherError> {
        let home_dir = match std::env::var_os("UPDRAFT_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(LauncherError::HomeDirNotFound)?
                .join(".updraft"),
        };

        let app_api = env_nonblank("UPDRAFT_APP_API_URL").unwrap_or_else(|| {
            latest_release_url(&env_nonblank("UPDRAFT_APP_REPO").unwrap_or_else(|| DEFAULT_APP_REPO.to_string()))
        });
        let launcher_api = env_nonblank("UPDRAFT_LAUNCHER_API_URL").unwrap_or_else(|| {
            latest_release_url(
                &env_nonblank("UPDRAFT_LAUNCHER_REPO").unwrap_or_else(|| DEFAULT_LAUNCHER_REPO.to_string()),
            )
        });

        let ext = platform::executable_asset_extension();
        let launcher_binary = if platform::is_windows() {
            "updraft.exe"
        } else {
            "updraft"
        };

        let app = ArtifactConfig {
            kind: ArtifactKind::App,
            api_url: app_api,
            asset_extension: ext.to_string(),
            install_path: home_dir.join(format!("app{ext}")),
            record_path: home_dir.join("installed-app.toml"),
        };
        let launcher = ArtifactConfig {
            kind: ArtifactKind::Launcher,
            api_url: launcher_api,
            asset_extension: ext.to_string(),
            install_path: home_dir.join(launcher_binary),
            record_path: home_dir.join("installed-launcher.toml"),
        };

        Ok(Self {
            home_dir,
            app,
            launcher,
        })
    }

    /// The configuration for one artifact kind.
    #[must_use]
    pub fn artifact(&self, kind: ArtifactKind) -> &ArtifactConfig {
        match kind {
            ArtifactKind::App => &self.app,
            ArtifactKind::Launcher => &self.launcher,
        }
    }
}

/// Optional bearer token for the release API, from `GITHUB_TOKEN`.
///
/// Blank values are treated as absent.
#[must_use]
pub fn auth_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn env_nonblank(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn latest_release_url(repo: &str) -> String {
    format!("https://api.github.com/repos/{repo}/releases/latest")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_is_a_part_sibling() {
        let cfg = ArtifactConfig {
            kind: ArtifactKind::App,
            api_url: String::new(),
            asset_extension: ".AppImage".to_string(),
            install_path: PathBuf::from("/home/u/.updraft/app.AppImage"),
            record_path: PathBuf::from("/home/u/.updraft/installed-app.toml"),
        };
        assert_eq!(
            cfg.staging_path(),
            PathBuf::from("/home/u/.updraft/app.AppImage.part")
        );
    }

    #[test]
    fn latest_release_url_shape() {
        assert_eq!(
            latest_release_url("owner/name"),
            "https://api.github.com/repos/owner/name/releases/latest"
        );
    }

    #[test]
    fn artifact_kind_display() {
        assert_eq!(ArtifactKind::App.to_string(), "app");
        assert_eq!(ArtifactKind::Launcher.to_string(), "launcher");
    }
}
