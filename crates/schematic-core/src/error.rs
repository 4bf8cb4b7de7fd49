//! Error types for schematic-core

use thiserror::Error;

/// Core error type for Schematic
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Required configuration key missing or blank
    #[error("[E003] Config is missing required key '{key}'")]
    ConfigIncomplete { key: String },

    /// E004: Invalid configuration value
    #[error("[E004] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E005: Two migration files share a version number
    #[error("[E005] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateMigration {
        version: u64,
        first: String,
        second: String,
    },

    /// E006: Leading digits of a migration file name do not fit a version
    #[error("[E006] Invalid migration version in '{path}'")]
    InvalidVersion { path: String },

    /// E007: No native or handler mapping for the migration's extension
    #[error("[E007] Unsupported migration type: {path}")]
    UnsupportedMigrationType { path: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
