//! In-memory git for orchestrator tests
//!
//! Checking out a branch writes that branch's descriptor into the temp
//! working tree, so the orchestrator reads it through the real reader.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use branchcheck::{BranchCheckError, Result, VersionControl};
use tempfile::TempDir;

pub fn pom(version: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n  <version>{version}</version>\n</project>\n"
    )
}

pub fn child_pom(parent_version: &str) -> String {
    format!(
        "<project>\n  <parent>\n    <version>{parent_version}</version>\n  </parent>\n  <artifactId>child</artifactId>\n</project>\n"
    )
}

/// Temp working tree with descriptors written at repo-relative paths
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with<S: AsRef<str>>(files: &[(&str, S)]) -> Self {
        let workspace = Self::new();
        for (relative, content) in files {
            workspace.write(relative, content.as_ref());
        }
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

pub struct FakeVcs {
    root: PathBuf,
    current: RefCell<String>,
    remote: Vec<(String, String)>,
    fail_branch: bool,
    dirty: RefCell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub fn on(root: &Path, branch: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            current: RefCell::new(branch.to_string()),
            remote: Vec::new(),
            fail_branch: false,
            dirty: RefCell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A remote branch whose root descriptor has the given content
    pub fn remote(mut self, branch: &str, descriptor: &str) -> Self {
        self.remote.push((branch.to_string(), descriptor.to_string()));
        self
    }

    /// `current_branch` fails, as outside a repository
    pub fn without_branch(mut self) -> Self {
        self.fail_branch = true;
        self
    }

    /// The working tree has uncommitted changes until the first stash
    pub fn with_local_changes(self) -> Self {
        *self.dirty.borrow_mut() = true;
        self
    }

    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn call(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl VersionControl for FakeVcs {
    fn current_branch(&self) -> Result<String> {
        if self.fail_branch {
            return Err(BranchCheckError::Process {
                command: "git rev-parse --abbrev-ref HEAD".to_string(),
                detail: "fatal: not a git repository".to_string(),
            });
        }
        Ok(self.current())
    }

    fn remote_branch_names(&self) -> Result<Vec<String>> {
        self.call("ls-remote");
        Ok(self.remote.iter().map(|(name, _)| name.clone()).collect())
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        self.call(format!("checkout {name}"));
        if let Some((_, descriptor)) = self.remote.iter().find(|(branch, _)| branch == name) {
            fs::write(self.root.join("pom.xml"), descriptor)?;
        }
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn fetch(&self) -> Result<()> {
        self.call("fetch");
        Ok(())
    }

    fn stash(&self) -> Result<bool> {
        self.call("stash");
        Ok(self.dirty.replace(false))
    }
}
