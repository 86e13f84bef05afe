//! Platform-specific helpers.
//!
//! Small, dependency-free functions that keep `cfg(windows)` branches out
//! of the rest of the codebase.

use std::path::Path;

/// Returns `true` when running on Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Filename extension expected for an executable release asset on this
/// platform, including the leading dot where one exists.
#[must_use]
pub const fn executable_asset_extension() -> &'static str {
    if cfg!(windows) { ".exe" } else { ".AppImage" }
}

/// Compare two paths for identity, resolving symlinks where possible.
///
/// Canonicalization requires both paths to exist; when either does not,
/// falls back to a direct comparison.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Mark a file as executable. No-op on Windows.
pub fn set_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_extension_matches_platform() {
        let ext = executable_asset_extension();
        if cfg!(windows) {
            assert_eq!(ext, ".exe");
        } else {
            assert_eq!(ext, ".AppImage");
        }
    }

    #[test]
    fn paths_equal_resolves_identical_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a");
        std::fs::write(&file, "x").unwrap();
        assert!(paths_equal(&file, &file));
        assert!(!paths_equal(&file, &dir.path().join("b")));
    }

    #[cfg(unix)]
    #[test]
    fn set_executable_sets_mode_bits() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bin");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        set_executable(&file).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
