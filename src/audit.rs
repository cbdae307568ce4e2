//! Duplicate version audit across remote branches

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};

use crate::vcs::VersionControl;

/// Version string -> branches declaring it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub versions: BTreeMap<String, Vec<String>>,
    /// Branches whose version was an unresolved placeholder
    pub skipped: Vec<String>,
    /// Local changes were stashed while switching branches
    pub stashed: bool,
}

/// A version declared by more than one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict<'a> {
    pub version: &'a str,
    pub branches: &'a [String],
}

impl DuplicateReport {
    pub fn record(&mut self, version: impl Into<String>, branch: impl Into<String>) {
        self.versions
            .entry(version.into())
            .or_default()
            .push(branch.into());
    }

    pub fn skip(&mut self, branch: impl Into<String>) {
        self.skipped.push(branch.into());
    }

    pub fn conflicts(&self) -> Vec<Conflict<'_>> {
        self.versions
            .iter()
            .filter(|(_, branches)| branches.len() > 1)
            .map(|(version, branches)| Conflict {
                version,
                branches,
            })
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.versions.values().any(|branches| branches.len() > 1)
    }
}

/// Checks out the original branch again when dropped, on success or error.
pub struct BranchRestore<'a, V: VersionControl + ?Sized> {
    vcs: &'a V,
    original: String,
}

impl<'a, V: VersionControl + ?Sized> BranchRestore<'a, V> {
    pub fn new(vcs: &'a V, original: impl Into<String>) -> Self {
        Self {
            vcs,
            original: original.into(),
        }
    }
}

impl<V: VersionControl + ?Sized> Drop for BranchRestore<'_, V> {
    fn drop(&mut self) {
        debug!("restoring branch {}", self.original);
        if let Err(e) = self.vcs.checkout_branch(&self.original) {
            error!("cannot restore original branch {}: {}", self.original, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts() {
        let mut report = DuplicateReport::default();
        report.record("1.0-SNAPSHOT", "develop");
        report.record("1.0-us_1-SNAPSHOT", "feature/US-1");
        report.record("1.0-SNAPSHOT", "feature/US-2");

        assert!(report.has_conflicts());
        let conflicts = report.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].version, "1.0-SNAPSHOT");
        assert_eq!(conflicts[0].branches, ["develop", "feature/US-2"]);
    }

    #[test]
    fn test_no_conflicts() {
        let mut report = DuplicateReport::default();
        report.record("1.0-SNAPSHOT", "develop");
        report.record("1.0-us_1-SNAPSHOT", "feature/US-1");
        report.skip("feature/templated");

        assert!(!report.has_conflicts());
        assert!(report.conflicts().is_empty());
        assert_eq!(report.skipped, vec!["feature/templated"]);
    }

    #[test]
    fn test_report_json() {
        let mut report = DuplicateReport::default();
        report.record("2.0-SNAPSHOT", "develop");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["versions"]["2.0-SNAPSHOT"][0], "develop");
        assert!(json["skipped"].as_array().unwrap().is_empty());
        assert_eq!(json["stashed"], false);
    }
}
