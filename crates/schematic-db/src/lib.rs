//! schematic-db - Database access layer for Schematic
//!
//! This crate provides the `Executor` trait, a shell-backed implementation
//! that talks to database clients and handler commands through their stdio,
//! and the `VersionStore` that owns the one-row version tracking table.

pub mod error;
pub mod shell;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod version_store;

pub use error::{DbError, DbResult};
pub use shell::ShellExecutor;
pub use traits::{CommandOutput, DiagnosticPolicy, Executor};
pub use version_store::VersionStore;
