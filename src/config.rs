//! Configuration management for branchcheck
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (branchcheck.toml) at the repository root
//! - User config file in the platform config directory
//! - Explicit file given with `--config`
//! - Environment variables (BRANCHCHECK_*)
//!
//! ## Example config file (branchcheck.toml):
//! ```toml
//! debug = false
//!
//! [descriptor]
//! file_name = "pom.xml"
//! excludes = ["legacy/pom.xml"]
//! ignore_dirs = [".git", "target"]
//!
//! [branches]
//! trunk = "develop"
//! roots = ["master", "main"]
//!
//! [git]
//! program = "git"
//! ```

use std::fmt;
use std::path::Path;

use config_crate::{Config, Environment, File};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::branch::{DETACHED_HEAD, TRUNK_BRANCH};
use crate::error::Result;

/// Main configuration, built once at startup and passed down explicitly
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchCheckConfig {
    /// Verbose logging; anything but `true` counts as off
    #[serde(default, deserialize_with = "lenient_flag")]
    pub debug: bool,

    /// Descriptor discovery settings
    #[serde(default)]
    pub descriptor: DescriptorConfig,

    /// Branch naming settings
    #[serde(default)]
    pub branches: BranchConfig,

    /// Git invocation settings
    #[serde(default)]
    pub git: GitConfig,
}

/// Descriptor discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// File name of a build descriptor
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Descriptor paths to skip, relative to the repository root
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

/// Branch naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Integration branch whose versions carry no story
    #[serde(default = "default_trunk")]
    pub trunk: String,

    /// Release branches that are never checked
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// Name git reports when not on a branch
    #[serde(default = "default_detached")]
    pub detached: String,
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Executable used for git commands
    #[serde(default = "default_git_program")]
    pub program: String,
}

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Check branch/version compatibility of every descriptor
    Check,
    /// Look for versions declared on more than one remote branch
    AuditDuplicates,
    /// Print the root descriptor's effective version
    ShowVersion,
}

impl Mode {
    /// Pick the mode from CLI switches. Show-version wins over the audit,
    /// which wins over the compatibility check.
    pub fn select(show_version: bool, audit_duplicates: bool, check: bool) -> Option<Self> {
        if show_version {
            Some(Self::ShowVersion)
        } else if audit_duplicates {
            Some(Self::AuditDuplicates)
        } else if check {
            Some(Self::Check)
        } else {
            None
        }
    }
}

// Default value functions
fn default_file_name() -> String {
    "pom.xml".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        "target".to_string(),
        "node_modules".to_string(),
    ]
}

fn default_trunk() -> String {
    TRUNK_BRANCH.to_string()
}

fn default_roots() -> Vec<String> {
    vec!["master".to_string(), "main".to_string()]
}

fn default_detached() -> String {
    DETACHED_HEAD.to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

/// Accept `true`/`false` as well as arbitrary strings and numbers, as
/// environment variables arrive. Only a case-insensitive `true` is on.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean flag")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<bool, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<bool, E> {
            Ok(value.trim().eq_ignore_ascii_case("true"))
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<bool, E> {
            Ok(false)
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<bool, E> {
            Ok(false)
        }

        fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<bool, E> {
            Ok(false)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            excludes: Vec::new(),
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            trunk: default_trunk(),
            roots: default_roots(),
            detached: default_detached(),
        }
    }
}

impl BranchConfig {
    pub fn is_trunk(&self, name: &str) -> bool {
        name == self.trunk
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.roots.iter().any(|root| root == name)
    }

    /// `HEAD` is a sentinel, never a branch to validate
    pub fn is_detached(&self, name: &str) -> bool {
        name == self.detached
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
        }
    }
}

impl BranchCheckConfig {
    /// Load configuration. Repository files are looked up under `root`
    /// (the current directory when no repository was found); `explicit`
    /// must exist when given.
    pub fn load_from(root: Option<&Path>, explicit: Option<&str>) -> Result<Self> {
        let base = root.unwrap_or(Path::new(""));
        let mut builder = Config::builder();

        let config_locations = [
            "branchcheck.toml",
            ".branchcheck.toml",
            "config/branchcheck.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::from(base.join(location)).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "branchcheck", "branchcheck") {
            let xdg_config = config_dir.config_dir().join("branchcheck.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // BRANCHCHECK_DEBUG=true, BRANCHCHECK_BRANCHES__TRUNK=integration, ...
        builder = builder.add_source(
            Environment::with_prefix("BRANCHCHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Add excludes given as a comma-separated list, e.g. `a/pom.xml,b/pom.xml`
    pub fn add_excludes(&mut self, list: &str) {
        self.descriptor.excludes.extend(
            list.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| entry.trim_start_matches("./").to_string()),
        );
    }

    /// Whether a repo-relative descriptor path is excluded
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.descriptor
            .excludes
            .iter()
            .any(|exclude| exclude == relative_path)
    }
}
