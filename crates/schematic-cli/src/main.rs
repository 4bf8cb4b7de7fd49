//! Schematic CLI - apply numbered migrations through a database client

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Mode};
use commands::{list, migrate, version};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.mode() {
        Mode::Migrate => migrate::execute(&cli).await,
        Mode::Fake => migrate::execute_fake(&cli).await,
        Mode::Update(target) => version::update(&cli, target).await,
        Mode::ShowVersion => version::show(&cli).await,
        Mode::List => list::execute(&cli).await,
    }
}

/// Log to stderr so stdout carries only command results.
///
/// `RUST_LOG` overrides the default level; records from the `log` facade
/// used by the library crates are bridged into the subscriber.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
