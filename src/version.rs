//! Release-tag version comparison.
//!
//! Release tags in the wild are loose: `v1.2.3`, `1.2`, `2.0.0-rc1`. The
//! comparator here is deliberately forgiving: each dot-separated segment
//! is reduced to its leading digit run and compared numerically, so a
//! malformed tag degrades to zero instead of failing an update check.
//! This is not semver: pre-release suffixes carry no ordering weight.

use crate::constants::UNVERSIONED_BUILD;

/// Returns `true` when `remote` denotes a strictly newer version than
/// `local`.
///
/// Rules:
/// - A single leading `v`/`V` is stripped from each side after trimming.
/// - Sides are split on `.`; a missing segment counts as `0`.
/// - Each segment converts via its longest leading run of ASCII digits
///   (`"10-beta"` → 10, `"beta"` → 0).
/// - The first differing segment, left to right, decides. Equal
///   throughout means not newer.
/// - A blank `remote` is never newer; a blank `local` loses to any
///   non-blank remote.
/// - The [`UNVERSIONED_BUILD`] sentinel compares as never-newer in either
///   direction, so development builds neither offer nor receive updates.
///
/// Pure and total: no input panics.
#[must_use]
pub fn is_newer(remote: &str, local: &str) -> bool {
    let remote = normalize(remote);
    let local = normalize(local);

    if remote.is_empty() {
        return false;
    }
    if remote == UNVERSIONED_BUILD || local == UNVERSIONED_BUILD {
        return false;
    }
    if local.is_empty() {
        return true;
    }

    let remote_segments: Vec<u64> = remote.split('.').map(segment_value).collect();
    let local_segments: Vec<u64> = local.split('.').map(segment_value).collect();

    let len = remote_segments.len().max(local_segments.len());
    for i in 0..len {
        let r = remote_segments.get(i).copied().unwrap_or(0);
        let l = local_segments.get(i).copied().unwrap_or(0);
        if r != l {
            return r > l;
        }
    }
    false
}

/// Trim whitespace and strip a single leading `v`/`V` prefix.
fn normalize(version: &str) -> &str {
    let trimmed = version.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    stripped.trim()
}

/// Numeric value of one version segment: its longest leading digit run,
/// saturating on overflow; no leading digits means zero.
fn segment_value(segment: &str) -> u64 {
    let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_newer_versions() {
        assert!(is_newer("1.0.1", "1.0.0"));
        assert!(is_newer("1.1.0", "1.0.9"));
        assert!(is_newer("2.0.0", "1.9.9"));
        assert!(is_newer("0.0.1", "0.0.0"));
        assert!(is_newer("0.1.0", "0.0.9"));
    }

    #[test]
    fn equal_versions_are_not_newer() {
        assert!(!is_newer("1.0.0", "1.0.0"));
        assert!(!is_newer("1.2.3", "1.2.3"));
    }

    #[test]
    fn older_versions_are_not_newer() {
        assert!(!is_newer("1.0.0", "1.0.1"));
        assert!(!is_newer("0.9.9", "1.0.0"));
    }

    #[test]
    fn v_prefix_is_stripped() {
        assert!(is_newer("v1.0.1", "v1.0.0"));
        assert!(is_newer("v2.0.0", "1.9.9"));
        assert!(is_newer("2.0.0", "v1.9.9"));
        assert!(is_newer("V2.0.0", "1.9.9"));
        assert!(!is_newer("v1.0.0", "v1.0.1"));
    }

    #[test]
    fn whitespace_variants_compare_equal() {
        let forms = ["1.0.0", "v1.0.0", " 1.0.0 ", "v 1.0.0 "];
        for a in forms {
            for b in forms {
                assert!(!is_newer(a, b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn blank_sides() {
        assert!(!is_newer("", "1.0.0"));
        assert!(!is_newer("   ", "1.0.0"));
        assert!(is_newer("1.0.0", ""));
        assert!(is_newer("1.0.0", "   "));
        assert!(!is_newer("", ""));
    }

    #[test]
    fn length_mismatch_pads_with_zero() {
        assert!(is_newer("1.0.1", "1.0"));
        assert!(!is_newer("1.0", "1.0.1"));
        assert!(!is_newer("1.0.1.0", "1.0.1"));
        assert!(!is_newer("1.0.1", "1.0.1.0"));
    }

    #[test]
    fn malformed_segments_degrade_to_zero() {
        assert!(is_newer("1.0.0", "invalid"));
        assert!(!is_newer("invalid", "1.0.0"));
        assert!(!is_newer("invalid", "invalid"));
        assert!(is_newer("10-beta", "9.9"));
        assert!(!is_newer("beta", "0.0.1"));
        // "1..0" reads as 1, 0, 0, equal to 1.0.0.
        assert!(!is_newer("1..0", "1.0.0"));
        assert!(!is_newer("1.0.0", "1..0"));
        assert!(is_newer("1..0", "invalid"));
    }

    #[test]
    fn unversioned_sentinel_never_updates() {
        assert!(!is_newer("1.0.0", UNVERSIONED_BUILD));
        assert!(!is_newer(UNVERSIONED_BUILD, "1.0.0"));
        assert!(!is_newer(UNVERSIONED_BUILD, UNVERSIONED_BUILD));
    }

    #[test]
    fn ordering_is_transitive_along_a_chain() {
        let versions = ["0.0.1", "0.1.0", "1.0.0", "1.0.1", "1.1.0", "2.0.0"];
        for (i, older) in versions.iter().enumerate() {
            for newer in &versions[i + 1..] {
                assert!(is_newer(newer, older), "{newer} > {older}");
                assert!(!is_newer(older, newer), "{older} < {newer}");
            }
        }
    }

    #[test]
    fn huge_segments_saturate_instead_of_panicking() {
        assert!(is_newer("99999999999999999999999", "1"));
        assert!(!is_newer("1", "99999999999999999999999"));
    }
}
