//! Migration model and extension-based classification

use crate::config::{normalize_extension, Config, HANDLER_PLACEHOLDER};
use std::path::{Path, PathBuf};

/// How a migration is applied, resolved once while cataloging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationKind {
    /// SQL sent verbatim to the database client
    Native,
    /// Dispatched to an external command selected by extension
    Handled { extension: String, template: String },
    /// No handler is registered for the extension; fails when applied
    Unsupported { extension: String },
}

impl MigrationKind {
    /// Classify a file extension against the configured handlers.
    ///
    /// An empty extension or `sql` is native.
    pub fn classify(extension: &str, config: &Config) -> Self {
        let ext = normalize_extension(extension);
        if ext.is_empty() || ext == "sql" {
            return MigrationKind::Native;
        }
        match config.handler_for(&ext) {
            Some(template) => MigrationKind::Handled {
                extension: ext,
                template: template.to_string(),
            },
            None => MigrationKind::Unsupported { extension: ext },
        }
    }

    /// Short label for listings and logs
    pub fn label(&self) -> &str {
        match self {
            MigrationKind::Native => "sql",
            MigrationKind::Handled { extension, .. } => extension,
            MigrationKind::Unsupported { extension } => extension,
        }
    }
}

/// A single versioned migration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Leading integer of the file name
    pub version: u64,

    /// Path to the migration file
    pub path: PathBuf,

    /// Resolved application strategy
    pub kind: MigrationKind,
}

impl Migration {
    /// Build a migration from a scanned file
    pub fn new(version: u64, path: PathBuf, config: &Config) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let kind = MigrationKind::classify(&extension, config);
        Self {
            version,
            path,
            kind,
        }
    }

    /// File name including extension
    pub fn file_name(&self) -> &str {
        file_name_str(&self.path)
    }

    /// File name with the extension stripped (`003-seed.py` -> `003-seed`)
    pub fn base_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Command line for a handled migration, `None` for any other kind
    pub fn handler_command(&self) -> Option<String> {
        match &self.kind {
            MigrationKind::Handled { template, .. } => {
                Some(template.replacen(HANDLER_PLACEHOLDER, self.base_name(), 1))
            }
            _ => None,
        }
    }
}

fn file_name_str(path: &Path) -> &str {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
}
