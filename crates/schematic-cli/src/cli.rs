//! CLI argument definitions using clap derive API

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Schematic - apply numbered migration files through a database client
#[derive(Parser, Debug)]
#[command(name = "schematic")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["update", "current_version", "fake", "list"])
        .multiple(false)
))]
pub struct Cli {
    /// Directory containing numbered migration files
    pub migrations_dir: PathBuf,

    /// Set the version marker to VERSION without running any migrations
    #[arg(short = 'u', long = "update", value_name = "VERSION")]
    pub update: Option<u64>,

    /// Print the current version and exit
    #[arg(short = 'v', long = "current-version")]
    pub current_version: bool,

    /// Do not apply migrations above this version
    #[arg(short = 'm', long = "max", value_name = "N")]
    pub max: Option<u64>,

    /// Mark pending migrations as applied without running them
    #[arg(short = 'F', long)]
    pub fake: bool,

    /// List pending migrations without applying them (never creates the
    /// version table)
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Print the run report or pending list as JSON
    #[arg(long, conflicts_with_all = ["update", "current_version"])]
    pub json: bool,

    /// Config file (default: schematic.yml in the migrations directory)
    #[arg(short, long, env = "SCHEMATIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Apply pending migrations
    Migrate,
    /// Mark pending migrations as applied
    Fake,
    /// Overwrite the version marker
    Update(u64),
    /// Print the version marker
    ShowVersion,
    /// Print pending migrations
    List,
}

impl Cli {
    /// Resolve the mutually exclusive mode flags
    pub fn mode(&self) -> Mode {
        if let Some(version) = self.update {
            Mode::Update(version)
        } else if self.current_version {
            Mode::ShowVersion
        } else if self.fake {
            Mode::Fake
        } else if self.list {
            Mode::List
        } else {
            Mode::Migrate
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
