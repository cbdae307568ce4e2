//! Branch/version compatibility
//!
//! Decides whether a topic branch name and a declared project version agree.
//! The version must be a snapshot whose body ends with the branch story,
//! transformed according to the branch prefix:
//!
//! ```text
//! feature/PRJ-4385                       0.0-prj_4385-SNAPSHOT
//!         lowercase, '-' -> '_'               ^^^^^^^^ byte-exact suffix
//!
//! hotfix/1.1.32.1-PRJ-000-xxx            1.1.32.1-PRJ-000-XXX-SNAPSHOT
//!        verbatim                                 case-insensitive suffix
//! ```
//!
//! Nothing here logs; callers render a [`Mismatch`] however they like.

use std::fmt;

use serde::Serialize;

use crate::branch::{split_branch, TopicKind};
use crate::version::strip_snapshot;

/// Why a branch and version do not agree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Mismatch {
    /// Branch is not `<prefix>/<story>`
    NotTaggableBranch { branch: String },
    /// Version lacks the `-SNAPSHOT` marker
    NotSnapshot { version: String },
    /// Prefix is neither `feature` nor `hotfix`
    UnknownPrefix { prefix: String },
    /// Story is present but its case differs from the normalized form
    WrongCase { expected: String, body: String },
    /// Version body does not end with the story at all
    WrongStory { expected: String, body: String },
}

impl Mismatch {
    /// Short stable identifier for the failed rule
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotTaggableBranch { .. } => "not_taggable_branch",
            Self::NotSnapshot { .. } => "not_snapshot",
            Self::UnknownPrefix { .. } => "unknown_prefix",
            Self::WrongCase { .. } => "wrong_case",
            Self::WrongStory { .. } => "wrong_story",
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTaggableBranch { branch } => write!(
                f,
                "branch {branch} is not a taggable branch: expected exactly one '/' as in feature/<story>"
            ),
            Self::NotSnapshot { version } => write!(
                f,
                "version {version} is not a snapshot version: release versions never match a topic branch"
            ),
            Self::UnknownPrefix { prefix } => write!(
                f,
                "branch prefix {prefix:?} is not recognised: expected feature or hotfix"
            ),
            Self::WrongCase { expected, body } => write!(
                f,
                "wrong case: version body {body} must end with {expected} exactly (lowercase story, '-' as '_')"
            ),
            Self::WrongStory { expected, body } => write!(
                f,
                "wrong story: version body {body} does not end with {expected}"
            ),
        }
    }
}

/// Normalize a feature story the way feature tooling stamps it into versions
pub fn normalize_feature_story(story: &str) -> String {
    story.to_lowercase().replace('-', "_")
}

/// Decide compatibility, reporting the first rule that fails.
pub fn check_compatibility(branch: &str, version: &str) -> Result<(), Mismatch> {
    let parts = split_branch(branch).ok_or_else(|| Mismatch::NotTaggableBranch {
        branch: branch.to_string(),
    })?;

    let body = strip_snapshot(version).ok_or_else(|| Mismatch::NotSnapshot {
        version: version.to_string(),
    })?;

    match TopicKind::from_prefix(parts.prefix) {
        Some(TopicKind::Feature) => check_feature(parts.story, body),
        Some(TopicKind::Hotfix) => check_hotfix(parts.story, body),
        None => Err(Mismatch::UnknownPrefix {
            prefix: parts.prefix.to_string(),
        }),
    }
}

/// Boolean form of [`check_compatibility`]
pub fn is_branch_version_compatible(branch: &str, version: &str) -> bool {
    check_compatibility(branch, version).is_ok()
}

fn check_feature(story: &str, body: &str) -> Result<(), Mismatch> {
    let expected = normalize_feature_story(story);
    if body.ends_with(&expected) {
        return Ok(());
    }
    if body.to_lowercase().ends_with(&expected) {
        return Err(Mismatch::WrongCase {
            expected,
            body: body.to_string(),
        });
    }
    Err(Mismatch::WrongStory {
        expected,
        body: body.to_string(),
    })
}

fn check_hotfix(story: &str, body: &str) -> Result<(), Mismatch> {
    let expected = story.to_lowercase();
    if body.to_lowercase().ends_with(&expected) {
        Ok(())
    } else {
        Err(Mismatch::WrongStory {
            expected,
            body: body.to_string(),
        })
    }
}
