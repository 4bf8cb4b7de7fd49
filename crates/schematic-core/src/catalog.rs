//! Migration directory scanning

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Extensions of compiled or cached artifacts that never count as migrations
const SKIPPED_EXTENSIONS: &[&str] = &["pyc", "pyo"];

static VERSION_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

/// Leading ASCII digits of a file name (`\d` would also match non-ASCII digits)
fn version_prefix_regex() -> &'static Regex {
    VERSION_PREFIX_RE.get_or_init(|| Regex::new(r"^[0-9]+").expect("valid regex"))
}

/// All migrations found in one directory, keyed by version
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    migrations: BTreeMap<u64, Migration>,
}

impl Catalog {
    /// Scan `directory` for migration files.
    ///
    /// Files whose name does not start with a digit are ignored, so a README
    /// or the config file can live next to the migrations.
    pub fn scan(directory: &Path, config: &Config) -> CoreResult<Self> {
        let entries = std::fs::read_dir(directory).map_err(|e| CoreError::IoWithPath {
            path: directory.display().to_string(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: directory.display().to_string(),
                source: e,
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            if !is_candidate(&path) {
                continue;
            }
            let Some(version) = parse_version(&path)? else {
                continue;
            };
            catalog.insert(Migration::new(version, path, config))?;
        }

        log::debug!(
            "Found {} migration(s) in {}",
            catalog.len(),
            directory.display()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-classified migrations
    pub fn from_migrations(migrations: impl IntoIterator<Item = Migration>) -> CoreResult<Self> {
        let mut catalog = Self::default();
        for migration in migrations {
            catalog.insert(migration)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, migration: Migration) -> CoreResult<()> {
        if let Some(existing) = self.migrations.get(&migration.version) {
            return Err(CoreError::DuplicateMigration {
                version: migration.version,
                first: existing.file_name().to_string(),
                second: migration.file_name().to_string(),
            });
        }
        self.migrations.insert(migration.version, migration);
        Ok(())
    }

    /// Look up a migration by version
    pub fn get(&self, version: u64) -> Option<&Migration> {
        self.migrations.get(&version)
    }

    /// Migrations in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Highest version present, if any
    pub fn latest_version(&self) -> Option<u64> {
        self.migrations.keys().next_back().copied()
    }

    /// Number of migrations
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the directory held no migrations
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// Regular, visible, non-artifact file with a UTF-8 name
fn is_candidate(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SKIPPED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Version number from the leading digits of a file name.
///
/// `Ok(None)` when the name has no leading digit.
fn parse_version(path: &Path) -> CoreResult<Option<u64>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let Some(digits) = version_prefix_regex().find(name) else {
        return Ok(None);
    };
    digits
        .as_str()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| CoreError::InvalidVersion {
            path: path.display().to_string(),
        })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
