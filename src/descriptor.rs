//! Build descriptor (POM) discovery and version extraction
//!
//! Only two fields matter:
//!
//! ```xml
//! <project>
//!   <parent>
//!     <version>2.0-FAKE_1234-SNAPSHOT</version>   <!-- inherited -->
//!   </parent>
//!   <version>3.0-FAKE_1234-SNAPSHOT</version>     <!-- own, wins when present -->
//! </project>
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::DescriptorConfig;
use crate::error::{BranchCheckError, Result};
use crate::version::has_unresolved_token;

#[derive(Debug, Default, Deserialize)]
struct ProjectModel {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    parent: Option<ParentModel>,
}

#[derive(Debug, Default, Deserialize)]
struct ParentModel {
    #[serde(default)]
    version: Option<String>,
}

/// Which field an effective version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    Own,
    Inherited,
}

/// A descriptor's version after the own/inherited fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveVersion {
    pub value: String,
    pub source: VersionSource,
}

impl EffectiveVersion {
    /// The version is a placeholder such as `${revision}`; callers skip it
    pub fn is_unresolved(&self) -> bool {
        has_unresolved_token(&self.value)
    }
}

impl fmt::Display for EffectiveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Read the effective version of the descriptor at `path`.
pub fn read_effective_version(path: &Path) -> Result<EffectiveVersion> {
    let content = fs::read_to_string(path).map_err(|source| BranchCheckError::DescriptorRead {
        path: path.to_path_buf(),
        source,
    })?;
    let effective = parse_effective_version(&content, path)?;
    debug!(
        "effective version {} ({:?}) in {}",
        effective.value,
        effective.source,
        path.display()
    );
    Ok(effective)
}

/// Extract the effective version from descriptor text; `path` is only used
/// for error reporting.
pub fn parse_effective_version(content: &str, path: &Path) -> Result<EffectiveVersion> {
    let model: ProjectModel =
        quick_xml::de::from_str(content).map_err(|source| BranchCheckError::DescriptorParse {
            path: path.to_path_buf(),
            source,
        })?;

    let own = non_blank(model.version);
    let inherited = non_blank(model.parent.and_then(|parent| parent.version));

    match (own, inherited) {
        (Some(value), _) => Ok(EffectiveVersion {
            value,
            source: VersionSource::Own,
        }),
        (None, Some(value)) => Ok(EffectiveVersion {
            value,
            source: VersionSource::Inherited,
        }),
        (None, None) => Err(BranchCheckError::MissingVersion {
            path: path.to_path_buf(),
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A descriptor found under the repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorPath {
    /// Path on disk
    pub path: PathBuf,
    /// Path relative to the repository root, `/`-separated (e.g. `a/pom.xml`)
    pub relative: String,
}

/// Find every descriptor under `root`, in sorted order.
pub fn find_descriptors(root: &Path, config: &DescriptorConfig) -> Result<Vec<DescriptorPath>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config
                    .ignore_dirs
                    .iter()
                    .any(|ignored| entry.file_name().to_str() == Some(ignored.as_str()))
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str() != Some(config.file_name.as_str()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        found.push(DescriptorPath {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    debug!("found {} descriptors under {}", found.len(), root.display());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<EffectiveVersion> {
        parse_effective_version(content, Path::new("pom.xml"))
    }

    #[test]
    fn test_own_version() {
        let v = parse("<project><version>1.0-FAKE_1234-SNAPSHOT</version></project>").unwrap();
        assert_eq!(v.value, "1.0-FAKE_1234-SNAPSHOT");
        assert_eq!(v.source, VersionSource::Own);
    }

    #[test]
    fn test_inherited_version() {
        let v = parse(
            "<project><parent><version>2.0-SNAPSHOT</version></parent><artifactId>a</artifactId></project>",
        )
        .unwrap();
        assert_eq!(v.value, "2.0-SNAPSHOT");
        assert_eq!(v.source, VersionSource::Inherited);
    }

    #[test]
    fn test_own_version_overrides_parent() {
        let v = parse(
            "<project><parent><version>2.0-SNAPSHOT</version></parent><version>3.0-SNAPSHOT</version></project>",
        )
        .unwrap();
        assert_eq!(v.value, "3.0-SNAPSHOT");
        assert_eq!(v.source, VersionSource::Own);
    }

    #[test]
    fn test_blank_versions_are_missing() {
        let err = parse("<project><parent><version> </version></parent><version></version></project>")
            .unwrap_err();
        assert!(matches!(err, BranchCheckError::MissingVersion { .. }));

        let err = parse("<project><artifactId>a</artifactId></project>").unwrap_err();
        assert!(matches!(err, BranchCheckError::MissingVersion { .. }));
    }

    #[test]
    fn test_unresolved_token_reported_not_skipped() {
        let v = parse("<project><version>${revision}</version></project>").unwrap();
        assert_eq!(v.value, "${revision}");
        assert!(v.is_unresolved());
    }

    #[test]
    fn test_unparseable_descriptor() {
        let err = parse("<project><version>1.0</version>").unwrap_err();
        assert!(matches!(err, BranchCheckError::DescriptorParse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_effective_version(Path::new("no/such/pom.xml")).unwrap_err();
        assert!(matches!(err, BranchCheckError::DescriptorRead { .. }));
    }

    #[test]
    fn test_find_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in ["pom.xml", "b/pom.xml", "a/pom.xml", "target/pom.xml", "a/target/pom.xml", "c/other.xml"] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<project/>").unwrap();
        }

        let found = find_descriptors(root, &DescriptorConfig::default()).unwrap();
        let relative: Vec<_> = found.iter().map(|d| d.relative.as_str()).collect();
        assert_eq!(relative, vec!["a/pom.xml", "b/pom.xml", "pom.xml"]);
        assert_eq!(found[2].path, root.join("pom.xml"));
    }
}
