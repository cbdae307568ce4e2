//! Error types for branchcheck

use std::path::PathBuf;

use thiserror::Error;

/// Result type for branchcheck operations
pub type Result<T> = std::result::Result<T, BranchCheckError>;

/// Errors that stop a run before (or instead of) producing a verdict.
///
/// Branch/version mismatches are not errors; they are reported through
/// [`crate::compat::Mismatch`] and [`crate::orchestrator::Violation`].
#[derive(Error, Debug)]
pub enum BranchCheckError {
    #[error("not inside a git working tree: {path}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("cannot determine current branch name: {0}")]
    BranchUndetermined(#[source] Box<BranchCheckError>),

    #[error("not on a branch (detached HEAD)")]
    DetachedHead,

    #[error("no {file_name} descriptors found under {root}")]
    NoDescriptors { root: PathBuf, file_name: String },

    #[error("cannot read descriptor {path}: {source}")]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse descriptor {path}: {source}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: quick_xml::de::DeError,
    },

    #[error("version and parent version are both empty in descriptor {path}")]
    MissingVersion { path: PathBuf },

    #[error("`{command}` failed: {detail}")]
    Process { command: String, detail: String },

    #[error("unparseable output from `{command}`: {line:?}")]
    UnparseableOutput { command: String, line: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BranchCheckError {
    /// Environment errors mean the check does not apply here, as opposed to
    /// a broken descriptor or a failing git invocation.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            Self::NotARepository { .. } | Self::BranchUndetermined(_) | Self::DetachedHead
        )
    }
}
