//! schematic-runner - Migration application for Schematic
//!
//! This crate walks an upgrade plan and applies each migration in order,
//! either as a native SQL transaction or through a configured handler
//! command, advancing the version marker after every success.

pub mod applier;
pub mod error;
pub mod report;

pub use applier::Applier;
pub use error::{RunnerError, RunnerResult};
pub use report::{AppliedMigration, ApplyReport, StopReason};
