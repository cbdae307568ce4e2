//! Branch naming conventions
//!
//! Topic branches are named `<prefix>/<story>`, e.g. `feature/PRJ-4385` or
//! `hotfix/1.1.32.1-PRJ-000`. The trunk is `develop`; `master`/`main` are
//! never checked, and `HEAD` means git is not on a branch at all.

use std::fmt;

use crate::config::BranchConfig;

/// Literal trunk branch name
pub const TRUNK_BRANCH: &str = "develop";

/// What `git rev-parse --abbrev-ref HEAD` prints when HEAD is detached
pub const DETACHED_HEAD: &str = "HEAD";

/// A well-formed `<prefix>/<story>` branch name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchParts<'a> {
    pub prefix: &'a str,
    pub story: &'a str,
}

impl fmt::Display for BranchParts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.story)
    }
}

/// Split a branch name into prefix and story.
///
/// Only names with exactly one `/` and two non-empty segments are taggable
/// branches; everything else yields `None`.
pub fn split_branch(branch: &str) -> Option<BranchParts<'_>> {
    let (prefix, story) = branch.split_once('/')?;
    if prefix.is_empty() || story.is_empty() || story.contains('/') {
        return None;
    }
    Some(BranchParts { prefix, story })
}

/// Recognised topic branch prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Feature,
    Hotfix,
}

impl TopicKind {
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "feature" => Some(Self::Feature),
            "hotfix" => Some(Self::Hotfix),
            _ => None,
        }
    }
}

/// How a checked-out branch is treated by the check mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    /// Not on a branch; nothing can be checked
    Detached,
    /// Release root (`master`/`main`); always skipped
    Root,
    /// Integration branch; versions must be plain snapshots
    Trunk,
    /// Anything else; versions must carry the branch story
    Topic,
}

impl BranchRole {
    pub fn classify(name: &str, branches: &BranchConfig) -> Self {
        if branches.is_detached(name) {
            Self::Detached
        } else if branches.is_root(name) {
            Self::Root
        } else if branches.is_trunk(name) {
            Self::Trunk
        } else {
            Self::Topic
        }
    }
}
