//! branchcheck CLI
//!
//! Pre-merge gate checking that the current branch name and the versions
//! declared in build descriptors agree.
//!
//! Usage:
//!   branchcheck                          check the current branch (default)
//!   branchcheck --excludes a/pom.xml     check, skipping some descriptors
//!   branchcheck --version-dups           find versions shared by remote branches
//!   branchcheck --pom-version            print the root descriptor version
//!
//! Exit codes: 0 ok, 1 violation or duplicate versions, 2 error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use branchcheck::{
    discover_root, BranchCheckConfig, BranchCheckError, GitCli, Mode, Orchestrator,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const COMMIT: Option<&str> = option_env!("BRANCHCHECK_COMMIT");

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "branchcheck")]
#[command(about = "Check that branch names and descriptor versions agree")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Comma-separated descriptors to exclude, relative to the repository root (e.g. a/pom.xml,b/pom.xml)
    #[arg(long, default_value = "")]
    excludes: String,

    /// Print the build identifier and exit
    #[arg(long)]
    version: bool,

    /// Check all remote branches for duplicate descriptor versions
    #[arg(long = "version-dups")]
    version_dups: bool,

    /// Verify branch name and descriptor versions are compatible
    #[arg(
        long = "branch-compat",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    branch_compat: bool,

    /// Print the effective version of the root descriptor
    #[arg(long = "pom-version")]
    pom_version: bool,

    /// Verbose logging (also BRANCHCHECK_DEBUG=true)
    #[arg(long)]
    debug: bool,

    /// Extra configuration file
    #[arg(long)]
    config: Option<String>,

    /// Directory to start looking for the repository from
    #[arg(short = 'C', long, default_value = ".")]
    directory: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let root = discover_root(&cli.directory);
    let config = BranchCheckConfig::load_from(root.as_deref().ok(), cli.config.as_deref());
    let debug = cli.debug || config.as_ref().is_ok_and(|c| c.debug);
    init_tracing(debug);

    info!("branchcheck build {}", build_id());
    if cli.version {
        println!("{}", build_id());
        return ExitCode::SUCCESS;
    }

    match run(&cli, root, config) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<BranchCheckError>() {
                Some(err) if err.is_environment() => warn!("not checking: {}", err),
                _ => error!("{:#}", e),
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("info,branchcheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_id() -> String {
    match COMMIT {
        Some(commit) => format!("{} ({})", env!("CARGO_PKG_VERSION"), commit),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn open(
    root: branchcheck::Result<PathBuf>,
    mut config: BranchCheckConfig,
    cli: &Cli,
) -> branchcheck::Result<Orchestrator<GitCli>> {
    config.add_excludes(&cli.excludes);
    config.debug |= cli.debug;
    let root = root?;
    debug!("repository root {}", root.display());
    let git = GitCli::new(config.git.program.clone(), &root);
    Ok(Orchestrator::new(config, git, root))
}

fn run(
    cli: &Cli,
    root: branchcheck::Result<PathBuf>,
    config: branchcheck::Result<BranchCheckConfig>,
) -> anyhow::Result<ExitCode> {
    let Some(mode) = Mode::select(cli.pom_version, cli.version_dups, cli.branch_compat) else {
        debug!("no mode selected");
        return Ok(ExitCode::SUCCESS);
    };

    match mode {
        Mode::ShowVersion => {
            // Informational only: never fails the run
            let config = config.unwrap_or_else(|e| {
                warn!("ignoring configuration: {}", e);
                BranchCheckConfig::default()
            });
            match open(root, config, cli).and_then(|o| o.show_version()) {
                Ok(version) => println!("{}", version),
                Err(e) => warn!("cannot read version: {}", e),
            }
            Ok(ExitCode::SUCCESS)
        }

        Mode::Check => {
            let orchestrator = open(root, config?, cli)?;
            let outcome = orchestrator.check()?;

            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }

            Ok(if outcome.is_violation() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }

        Mode::AuditDuplicates => {
            let orchestrator = open(root, config?, cli)?;
            let report = orchestrator
                .audit_duplicates()
                .context("duplicate version audit failed")?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => {
                    let conflicts = report.conflicts();
                    if conflicts.is_empty() {
                        println!("no duplicate versions across {} versions", report.versions.len());
                    }
                    for conflict in &conflicts {
                        println!(
                            "multiple branches {:?} with version {}",
                            conflict.branches, conflict.version
                        );
                    }
                    for branch in &report.skipped {
                        println!("skipped {} (unresolved version)", branch);
                    }
                }
            }

            Ok(if report.has_conflicts() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}
