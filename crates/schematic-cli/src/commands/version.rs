//! Version marker commands (`--current-version`, `--update`)

use anyhow::{Context, Result};
use schematic_runner::Applier;

use crate::cli::Cli;
use crate::commands::common::{executors, load_config};

/// Print the current version marker
pub async fn show(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let (database, handlers) = executors(cli);
    let applier = Applier::new(&config, &database, &handlers);

    let version = applier
        .current_version()
        .await
        .context("Failed to read current version")?;
    println!("{version}");
    Ok(())
}

/// Overwrite the version marker without running migrations
pub async fn update(cli: &Cli, target: u64) -> Result<()> {
    let config = load_config(cli)?;
    let (database, handlers) = executors(cli);
    let applier = Applier::new(&config, &database, &handlers);

    applier
        .force_version(target)
        .await
        .with_context(|| format!("Failed to set version to {target}"))?;
    println!("Version set to {target}");
    Ok(())
}
