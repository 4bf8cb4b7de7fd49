//! Configuration types and parsing for schematic.yml

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder in a handler template that receives the migration's base name
pub const HANDLER_PLACEHOLDER: &str = "%s";

/// File names searched for in a migrations directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["schematic.yml", "schematic.yaml"];

/// Migration runner configuration from schematic.yml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Shell command of the database client. Reads SQL on stdin and must
    /// print only query results on stdout.
    #[serde(default)]
    pub db: String,

    /// Name of the one-row version tracking table
    #[serde(default)]
    pub table: String,

    /// Extension to command template mapping for non-SQL migrations.
    ///
    /// Keys are normalized to bare lowercase extensions (`py`, not `.py`).
    #[serde(default)]
    pub handlers: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load configuration from a migrations directory.
    /// Looks for schematic.yml or schematic.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Parse and validate YAML configuration text.
    ///
    /// `origin` only labels parse errors.
    pub fn parse(content: &str, origin: &str) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        let config = config.normalize_handlers()?;
        config.validate()?;
        Ok(config)
    }

    /// Rewrite handler keys to bare lowercase extensions
    fn normalize_handlers(mut self) -> CoreResult<Self> {
        let mut normalized = BTreeMap::new();
        for (key, template) in std::mem::take(&mut self.handlers) {
            let ext = normalize_extension(&key);
            if normalized.insert(ext.clone(), template).is_some() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("handler for extension '{ext}' is defined more than once"),
                });
            }
        }
        self.handlers = normalized;
        Ok(self)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.db.trim().is_empty() {
            return Err(CoreError::ConfigIncomplete {
                key: "db".to_string(),
            });
        }
        if self.table.trim().is_empty() {
            return Err(CoreError::ConfigIncomplete {
                key: "table".to_string(),
            });
        }

        for (ext, template) in &self.handlers {
            if ext.is_empty() || ext == "sql" {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "handler key '{ext}' is reserved for native SQL migrations"
                    ),
                });
            }
            if !template.contains(HANDLER_PLACEHOLDER) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "handler for '{ext}' must contain a '{HANDLER_PLACEHOLDER}' placeholder: {template}"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the command template registered for a file extension
    pub fn handler_for(&self, extension: &str) -> Option<&str> {
        self.handlers
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }
}

/// Strip a leading dot and lowercase an extension
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
