//! Version control adapter
//!
//! Every git interaction goes through [`VersionControl`], so the modes in
//! [`crate::orchestrator`] can run against an in-memory fake in tests. The
//! production [`GitCli`] shells out to the git executable and blocks until
//! each command finishes.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::Repository;
use tracing::debug;

use crate::error::{BranchCheckError, Result};

/// Prefix `git ls-remote --heads` puts in front of branch names
pub const HEADS_PREFIX: &str = "refs/heads/";

/// What `git stash` prints when the working tree is clean
const NOTHING_TO_STASH: &str = "No local changes to save";

pub trait VersionControl {
    /// Short name of the checked-out branch, or `HEAD` when detached
    fn current_branch(&self) -> Result<String>;
    /// Short names of the branches on the default remote
    fn remote_branch_names(&self) -> Result<Vec<String>>;
    fn checkout_branch(&self, name: &str) -> Result<()>;
    fn fetch(&self) -> Result<()>;
    /// Stash all local changes, untracked files included. Returns whether
    /// anything was stashed.
    fn stash(&self) -> Result<bool>;
}

/// Locate the working tree that contains `start`.
pub fn discover_root(start: &Path) -> Result<PathBuf> {
    let not_a_repository = |source: git2::Error| BranchCheckError::NotARepository {
        path: start.to_path_buf(),
        source,
    };
    let repo = Repository::discover(start).map_err(not_a_repository)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| not_a_repository(git2::Error::from_str("repository has no working tree")))
}

/// [`VersionControl`] backed by the git command line
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    /// Run a git subcommand, returning stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("running {command}");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|err| BranchCheckError::Process {
                command: command.clone(),
                detail: err.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BranchCheckError::Process {
                command,
                detail: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        String::from_utf8(output.stdout).map_err(|err| BranchCheckError::Process {
            command,
            detail: err.to_string(),
        })
    }
}

impl VersionControl for GitCli {
    fn current_branch(&self) -> Result<String> {
        let stdout = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let branch = stdout.trim();
        if branch.is_empty() {
            return Err(BranchCheckError::UnparseableOutput {
                command: "git rev-parse --abbrev-ref HEAD".to_string(),
                line: stdout,
            });
        }
        Ok(branch.to_string())
    }

    fn remote_branch_names(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["ls-remote", "--heads"])?;
        parse_ls_remote(&stdout)
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name]).map(drop)
    }

    fn fetch(&self) -> Result<()> {
        self.run(&["fetch"]).map(drop)
    }

    fn stash(&self) -> Result<bool> {
        let stdout = self.run(&["stash", "--include-untracked"])?;
        Ok(!stdout.contains(NOTHING_TO_STASH))
    }
}

/// Parse `git ls-remote --heads` output (`<sha>\trefs/heads/<name>` per line).
pub fn parse_ls_remote(output: &str) -> Result<Vec<String>> {
    let unparseable = |line: &str| BranchCheckError::UnparseableOutput {
        command: "git ls-remote --heads".to_string(),
        line: line.to_string(),
    };

    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .nth(1)
                .and_then(|reference| reference.strip_prefix(HEADS_PREFIX))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or_else(|| unparseable(line))
        })
        .collect()
}
