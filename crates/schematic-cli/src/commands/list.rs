//! List command implementation: show the plan without applying it

use anyhow::{Context, Result};
use schematic_core::{Catalog, UpgradePlan};
use schematic_runner::Applier;
use serde::Serialize;

use crate::cli::Cli;
use crate::commands::common::{executors, load_catalog, load_config};

/// One pending migration in `--list` output
#[derive(Debug, Serialize)]
struct PendingEntry {
    version: u64,
    file: String,
    kind: String,
}

/// `--list --json` document
#[derive(Debug, Serialize)]
struct PendingList {
    current_version: u64,
    latest_version: Option<u64>,
    max_version: Option<u64>,
    pending: Vec<PendingEntry>,
    held_back: Option<u64>,
}

impl PendingList {
    fn from_plan(plan: &UpgradePlan<'_>, catalog: &Catalog) -> Self {
        Self {
            current_version: plan.current_version(),
            latest_version: catalog.latest_version(),
            max_version: plan.ceiling(),
            pending: plan
                .within_ceiling()
                .map(|m| PendingEntry {
                    version: m.version,
                    file: m.file_name().to_string(),
                    kind: m.kind.label().to_string(),
                })
                .collect(),
            held_back: plan.held_back().map(|m| m.version),
        }
    }
}

/// Print pending migrations
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli, &config)?;
    let (database, handlers) = executors(cli);
    let applier = Applier::new(&config, &database, &handlers);

    let plan = applier
        .preview(&catalog, cli.max)
        .await
        .context("Failed to compute pending migrations")?;
    let list = PendingList::from_plan(&plan, &catalog);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("Current version: {}", list.current_version);
    if let Some(latest) = list.latest_version {
        println!("Latest available: {latest}");
    }
    if list.pending.is_empty() {
        println!("No pending migrations");
    } else {
        let width = list
            .pending
            .iter()
            .map(|e| e.version.to_string().len())
            .max()
            .unwrap_or(1);
        for entry in &list.pending {
            println!(
                "  {:>width$}  {:<4}  {}",
                entry.version, entry.kind, entry.file
            );
        }
    }
    if let Some(next) = list.held_back {
        println!("Held back by maximum version: {next} and later");
    }
    Ok(())
}
