//! branchcheck
//!
//! Keeps branch names and declared project versions in step for repositories
//! using a develop/feature/hotfix workflow. Run as a pre-merge or pre-commit
//! gate, it fails when the checked-out branch and the version in any build
//! descriptor (`pom.xml`) disagree.
//!
//! ## Conventions
//!
//! ```text
//! branch                         version
//! develop                        2.14.15-SNAPSHOT
//! feature/PRJ-4385               0.0-prj_4385-SNAPSHOT
//! hotfix/PRJ-000-XXX-test        1.1.32.1-PRJ-000-XXX-test-SNAPSHOT
//! master, main                   not checked
//! ```
//!
//! ## Modes
//!
//! - **check**: validate every descriptor against the current branch
//! - **audit-duplicates**: find versions declared on more than one remote branch
//! - **show-version**: print the root descriptor's effective version

pub mod audit;
pub mod branch;
pub mod compat;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod orchestrator;
pub mod vcs;
pub mod version;

pub use audit::DuplicateReport;
pub use branch::{split_branch, BranchParts, BranchRole};
pub use compat::{check_compatibility, is_branch_version_compatible, Mismatch};
pub use config::{BranchCheckConfig, Mode};
pub use descriptor::{read_effective_version, EffectiveVersion};
pub use error::{BranchCheckError, Result};
pub use orchestrator::{CheckOutcome, Orchestrator, Violation, ViolationKind};
pub use vcs::{discover_root, GitCli, VersionControl};
pub use version::is_trunk_version_valid;
