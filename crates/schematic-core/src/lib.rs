//! schematic-core - Core library for Schematic
//!
//! This crate provides configuration parsing, the migration model, directory
//! scanning into a version-keyed catalog, and upgrade planning. Nothing here
//! talks to a database; see `schematic-db` for that.

pub mod catalog;
pub mod config;
pub mod error;
pub mod migration;
pub mod plan;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use migration::{Migration, MigrationKind};
pub use plan::UpgradePlan;
