//! Version string rules
//!
//! Project versions come in two shapes:
//!
//! ```text
//! 2.14.15-SNAPSHOT              trunk (develop) version
//! 1.1-prj_4385-SNAPSHOT         branch-tagged version, story before the marker
//! 1.1                           release version, never branch-taggable
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Marker that makes a version pre-release and branch-taggable
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Leading character of an unexpanded property placeholder such as `${revision}`
pub const TOKEN_MARKER: char = '$';

static TRUNK_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9][0-9]*(\.(0|[1-9][0-9]*))+-SNAPSHOT$").unwrap()
});

/// Check a version declared on the trunk branch.
///
/// Valid versions are dotted numeric groups (at least `<major>.<minor>`)
/// followed directly by `-SNAPSHOT`. A story segment between the numbers and
/// the marker makes the version invalid.
pub fn is_trunk_version_valid(version: &str) -> bool {
    TRUNK_VERSION.is_match(version)
}

/// Split off the `-SNAPSHOT` marker, returning the version body.
///
/// Returns `None` for release versions.
pub fn strip_snapshot(version: &str) -> Option<&str> {
    version.strip_suffix(SNAPSHOT_SUFFIX)
}

/// Whether the version is still a property placeholder the build would expand
pub fn has_unresolved_token(version: &str) -> bool {
    version.starts_with(TOKEN_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_versions() {
        for version in ["1.0-SNAPSHOT", "2.14-SNAPSHOT", "2.14.15-SNAPSHOT", "10.0.1-SNAPSHOT"] {
            assert!(is_trunk_version_valid(version), "{version} should be valid");
        }
    }

    #[test]
    fn test_invalid_trunk_versions() {
        for version in [
            "1.0-us_feature-SNAPSHOT",
            "2.14-bug_77-SNAPSHOT",
            "1.0",
            "1-SNAPSHOT",
            "0.1-SNAPSHOT",
            "01.1-SNAPSHOT",
            "1.01-SNAPSHOT",
            "1.x-SNAPSHOT",
            "1.0-SNAPSHOT-extra",
            "v1.0-SNAPSHOT",
            "1.0-snapshot",
        ] {
            assert!(!is_trunk_version_valid(version), "{version} should be invalid");
        }
    }

    #[test]
    fn test_strip_snapshot() {
        assert_eq!(strip_snapshot("1.0-SNAPSHOT"), Some("1.0"));
        assert_eq!(strip_snapshot("1.0-prj_2-SNAPSHOT"), Some("1.0-prj_2"));
        assert_eq!(strip_snapshot("1.0"), None);
        assert_eq!(strip_snapshot("1.0-snapshot"), None);
    }

    #[test]
    fn test_unresolved_token() {
        assert!(has_unresolved_token("${revision}"));
        assert!(has_unresolved_token("${project.version}-SNAPSHOT"));
        assert!(!has_unresolved_token("1.0-SNAPSHOT"));
    }
}
