//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use schematic_core::{Catalog, Config};
use schematic_db::ShellExecutor;

use crate::cli::Cli;

/// Load the configuration named by `--config`, or the one in the migrations
/// directory.
pub(crate) fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(&cli.migrations_dir),
    }
    .context("Failed to load configuration")?;

    log::debug!(
        "Using database command '{}' with table {}",
        config.db,
        config.table
    );
    Ok(config)
}

/// Scan the migrations directory
pub(crate) fn load_catalog(cli: &Cli, config: &Config) -> Result<Catalog> {
    Catalog::scan(&cli.migrations_dir, config).with_context(|| {
        format!(
            "Failed to scan migrations in {}",
            cli.migrations_dir.display()
        )
    })
}

/// Executors for the database client and for handler commands.
///
/// Handlers run from the migrations directory so templates can refer to the
/// migration by base name.
pub(crate) fn executors(cli: &Cli) -> (ShellExecutor, ShellExecutor) {
    (
        ShellExecutor::database(),
        ShellExecutor::handler().in_dir(&cli.migrations_dir),
    )
}
