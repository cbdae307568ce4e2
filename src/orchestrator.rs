//! Run modes
//!
//! ```text
//! check            current branch -> every descriptor -> trunk or topic rule
//! audit-duplicates fetch -> for each remote branch: stash, checkout, read root descriptor
//! show-version     root descriptor -> effective version
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::{BranchRestore, DuplicateReport};
use crate::branch::BranchRole;
use crate::compat::{check_compatibility, Mismatch};
use crate::config::BranchCheckConfig;
use crate::descriptor::{find_descriptors, read_effective_version, EffectiveVersion};
use crate::error::{BranchCheckError, Result};
use crate::vcs::VersionControl;
use crate::version::is_trunk_version_valid;

/// Rule a descriptor broke
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViolationKind {
    /// Trunk version carries a story or is not a plain snapshot
    TrunkVersion,
    /// Topic branch and version disagree
    BranchVersion { mismatch: Mismatch },
}

/// The first descriptor that failed a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub branch: String,
    pub descriptor: String,
    pub version: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::TrunkVersion => write!(
                f,
                "invalid trunk version {} in {} on branch {}: expected <major>.<minor>[.<n>...]-SNAPSHOT",
                self.version, self.descriptor, self.branch
            ),
            ViolationKind::BranchVersion { mismatch } => write!(
                f,
                "branch {} has invalid version {} in {}: {}",
                self.branch, self.version, self.descriptor, mismatch
            ),
        }
    }
}

/// Result of the check mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Every descriptor that could be checked passed
    Passed {
        branch: String,
        checked: usize,
        skipped: usize,
    },
    /// The branch is a release root and is never checked
    SkippedBranch { branch: String },
    Violation(Violation),
}

impl CheckOutcome {
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Violation(_))
    }
}

pub struct Orchestrator<V: VersionControl> {
    config: BranchCheckConfig,
    vcs: V,
    root: PathBuf,
}

impl<V: VersionControl> Orchestrator<V> {
    pub fn new(config: BranchCheckConfig, vcs: V, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            vcs,
            root: root.into(),
        }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    fn current_branch(&self) -> Result<String> {
        self.vcs
            .current_branch()
            .map_err(|e| BranchCheckError::BranchUndetermined(Box::new(e)))
    }

    fn root_descriptor(&self) -> PathBuf {
        self.root.join(&self.config.descriptor.file_name)
    }

    /// Check every descriptor against the current branch. Stops at the first
    /// violation.
    pub fn check(&self) -> Result<CheckOutcome> {
        let branch = self.current_branch()?;
        let role = BranchRole::classify(&branch, &self.config.branches);

        match role {
            BranchRole::Detached => return Err(BranchCheckError::DetachedHead),
            BranchRole::Root => {
                info!("branch {branch} is never analyzed, skipping");
                return Ok(CheckOutcome::SkippedBranch { branch });
            }
            BranchRole::Trunk | BranchRole::Topic => {}
        }
        debug!("analyzing branch {branch} as {role:?}");

        let descriptors = find_descriptors(&self.root, &self.config.descriptor)?;
        if descriptors.is_empty() {
            return Err(BranchCheckError::NoDescriptors {
                root: self.root.clone(),
                file_name: self.config.descriptor.file_name.clone(),
            });
        }

        let mut checked = 0;
        let mut skipped = 0;
        for descriptor in descriptors {
            if self.config.is_excluded(&descriptor.relative) {
                debug!("skipping excluded descriptor {}", descriptor.relative);
                skipped += 1;
                continue;
            }
            debug!("analyzing {}", descriptor.relative);

            let effective = read_effective_version(&descriptor.path)?;
            if effective.is_unresolved() {
                info!(
                    "skipping {} because of unresolvable token {} in version element",
                    descriptor.relative, effective.value
                );
                skipped += 1;
                continue;
            }

            let kind = match role {
                BranchRole::Trunk if !is_trunk_version_valid(&effective.value) => {
                    Some(ViolationKind::TrunkVersion)
                }
                BranchRole::Trunk => None,
                _ => check_compatibility(&branch, &effective.value)
                    .err()
                    .map(|mismatch| ViolationKind::BranchVersion { mismatch }),
            };

            if let Some(kind) = kind {
                let violation = Violation {
                    branch,
                    descriptor: descriptor.relative,
                    version: effective.value,
                    kind,
                };
                warn!("{violation}");
                return Ok(CheckOutcome::Violation(violation));
            }
            checked += 1;
        }

        info!("branch {branch}: {checked} descriptors compatible, {skipped} skipped");
        Ok(CheckOutcome::Passed {
            branch,
            checked,
            skipped,
        })
    }

    /// Map every remote branch's root descriptor version to the branches
    /// declaring it. The original branch is checked out again afterwards,
    /// also when reading a branch fails.
    pub fn audit_duplicates(&self) -> Result<DuplicateReport> {
        let original = self.current_branch()?;
        if BranchRole::classify(&original, &self.config.branches) == BranchRole::Detached {
            return Err(BranchCheckError::DetachedHead);
        }

        self.vcs.fetch()?;
        let branches = self.vcs.remote_branch_names()?;
        debug!("auditing {} remote branches", branches.len());

        let mut stashed = false;
        let collected = {
            let _restore = BranchRestore::new(&self.vcs, original);
            self.collect_versions(branches, &mut stashed)
        };
        if stashed {
            warn!("local changes were stashed before switching branches; recover them from `git stash list`");
        }
        let mut report = collected?;
        report.stashed = stashed;

        for conflict in report.conflicts() {
            warn!(
                "multiple branches {:?} with version {}",
                conflict.branches, conflict.version
            );
        }
        Ok(report)
    }

    /// Stash, check out and read the root descriptor of every branch.
    /// `stashed` is set as soon as any stash saved local changes, also when
    /// a later branch fails.
    fn collect_versions(&self, branches: Vec<String>, stashed: &mut bool) -> Result<DuplicateReport> {
        let descriptor = self.root_descriptor();
        let mut report = DuplicateReport::default();

        for branch in branches {
            *stashed |= self.vcs.stash()?;
            self.vcs.checkout_branch(&branch)?;

            let effective = read_effective_version(&descriptor)?;
            if effective.is_unresolved() {
                info!(
                    "skipping branch {branch} because of unresolvable token {} in version element",
                    effective.value
                );
                report.skip(branch);
                continue;
            }
            debug!("branch {branch} declares {}", effective.value);
            report.record(effective.value, branch);
        }
        Ok(report)
    }

    /// Effective version of the descriptor at the repository root
    pub fn show_version(&self) -> Result<EffectiveVersion> {
        read_effective_version(&self.root_descriptor())
    }
}
