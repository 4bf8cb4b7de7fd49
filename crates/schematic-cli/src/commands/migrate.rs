//! Migrate command implementation (default mode and `--fake`)

use anyhow::{Context, Result};
use schematic_runner::{Applier, ApplyReport, StopReason};

use crate::cli::Cli;
use crate::commands::common::{executors, load_catalog, load_config};

/// Apply every pending migration up to `--max`
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli, &config)?;
    let (database, handlers) = executors(cli);
    let applier = Applier::new(&config, &database, &handlers);

    let report = applier
        .run_upgrades(&catalog, cli.max)
        .await
        .context("Migration run aborted")?;

    if cli.json {
        return print_json(&report);
    }
    for applied in &report.applied {
        println!(
            "Applied {}: {} ({:.2}s)",
            applied.version,
            applied.file,
            applied.duration.as_secs_f64()
        );
        if let Some(output) = applied.output.as_deref().filter(|o| !o.trim().is_empty()) {
            for line in output.lines() {
                println!("    {line}");
            }
        }
    }
    print_outcome(&report, cli.max);
    Ok(())
}

/// Mark every pending migration up to `--max` as applied
pub async fn execute_fake(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = load_catalog(cli, &config)?;
    let (database, handlers) = executors(cli);
    let applier = Applier::new(&config, &database, &handlers);

    let report = applier
        .fake_upgrades(&catalog, cli.max)
        .await
        .context("Fake apply aborted")?;

    if cli.json {
        return print_json(&report);
    }
    for applied in &report.applied {
        println!("Marked {}: {}", applied.version, applied.file);
    }
    print_outcome(&report, cli.max);
    Ok(())
}

fn print_json(report: &ApplyReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_outcome(report: &ApplyReport, max: Option<u64>) {
    if report.changed() {
        println!(
            "Version {} -> {} ({} migration{})",
            report.starting_version,
            report.final_version,
            report.applied.len(),
            if report.applied.len() == 1 { "" } else { "s" }
        );
    } else {
        println!("Already up to date at version {}", report.final_version);
    }

    if let (StopReason::Ceiling(next), Some(max)) = (report.stopped, max) {
        println!("Stopped before {next}: above maximum version {max}");
    }
}
