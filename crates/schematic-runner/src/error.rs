//! Error types for schematic-runner

use schematic_core::CoreError;
use schematic_db::DbError;
use thiserror::Error;

/// Errors that abort a migration run
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration or catalog error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Version table access failed
    #[error(transparent)]
    Db(#[from] DbError),

    /// Native migration file could not be read (R001)
    #[error("[R001] Failed to read migration '{path}': {source}")]
    ReadMigration {
        path: String,
        source: std::io::Error,
    },

    /// A migration's payload or handler failed (R002)
    #[error("[R002] Migration {version} ({file}) failed: {source}")]
    MigrationFailed {
        version: u64,
        file: String,
        #[source]
        source: DbError,
    },
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
