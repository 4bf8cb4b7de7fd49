//! Version tracking table access
//!
//! The tracking table has a single `version` column and exactly one row. All
//! reads and writes go through the database client's stdin/stdout, so the SQL
//! here is kept to the lowest common denominator every client understands.

use crate::error::{DbError, DbResult};
use crate::traits::Executor;
use schematic_core::Config;

/// `SELECT COUNT(*)` against the tracking table
pub fn count_rows_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table};")
}

/// DDL for a fresh tracking table
pub fn create_table_sql(table: &str) -> String {
    format!("CREATE TABLE {table} (version INTEGER NOT NULL);")
}

/// Seed row inserted into an empty tracking table
pub fn insert_initial_sql(table: &str) -> String {
    format!("INSERT INTO {table} (version) VALUES (0);")
}

/// Read the current version
pub fn select_version_sql(table: &str) -> String {
    format!("SELECT version FROM {table};")
}

/// Overwrite the version of the single row
pub fn update_version_sql(table: &str, version: u64) -> String {
    format!("UPDATE {table} SET version = {version};")
}

/// Wrap a migration payload and its version bump in one transaction
pub fn transaction_sql(payload: &str, table: &str, version: u64) -> String {
    let payload = payload.trim_end();
    let terminator = if payload.is_empty() || payload.ends_with(';') {
        ""
    } else {
        ";"
    };
    format!(
        "BEGIN;\n{payload}{terminator}\n{}\nCOMMIT;\n",
        update_version_sql(table, version)
    )
}

/// Reads and writes the version marker through a database executor
pub struct VersionStore<'a> {
    executor: &'a dyn Executor,
    command: &'a str,
    table: &'a str,
}

impl<'a> VersionStore<'a> {
    /// Create a store for `table`, reached by running `command`
    pub fn new(executor: &'a dyn Executor, command: &'a str, table: &'a str) -> Self {
        Self {
            executor,
            command,
            table,
        }
    }

    /// Create a store from the configured database command and table
    pub fn from_config(executor: &'a dyn Executor, config: &'a Config) -> Self {
        Self::new(executor, &config.db, &config.table)
    }

    async fn query(&self, sql: &str) -> DbResult<String> {
        let output = self.executor.run(self.command, Some(sql)).await?;
        Ok(output.stdout)
    }

    /// Create the tracking table if needed and make sure it holds one row.
    ///
    /// A failing row count is taken to mean the table does not exist yet.
    /// Safe to call on every run.
    pub async fn ensure_table(&self) -> DbResult<()> {
        let count = match self.query(&count_rows_sql(self.table)).await {
            Ok(out) => parse_single_integer(&out)?,
            Err(DbError::ExternalFailure { .. }) => {
                log::info!("Creating version table {}", self.table);
                self.query(&create_table_sql(self.table)).await?;
                0
            }
            Err(e) => return Err(e),
        };

        if count == 0 {
            log::debug!("Initializing version table {} at 0", self.table);
            self.query(&insert_initial_sql(self.table)).await?;
        }
        Ok(())
    }

    /// Current version marker
    pub async fn read_version(&self) -> DbResult<u64> {
        let out = self.query(&select_version_sql(self.table)).await?;
        parse_single_integer(&out)
    }

    /// Current version marker without creating or seeding the table.
    ///
    /// `None` when the table is missing or has no row yet.
    pub async fn peek_version(&self) -> DbResult<Option<u64>> {
        let count = match self.query(&count_rows_sql(self.table)).await {
            Ok(out) => parse_single_integer(&out)?,
            Err(DbError::ExternalFailure { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if count == 0 {
            return Ok(None);
        }
        self.read_version().await.map(Some)
    }

    /// Overwrite the version marker
    pub async fn write_version(&self, version: u64) -> DbResult<()> {
        self.query(&update_version_sql(self.table, version)).await?;
        Ok(())
    }

    /// Run `payload` and bump the marker to `version` in one transaction.
    ///
    /// Both statements go to the client in a single invocation; if either
    /// fails the database discards the whole unit.
    pub async fn apply_with_version_bump(&self, payload: &str, version: u64) -> DbResult<()> {
        self.query(&transaction_sql(payload, self.table, version))
            .await?;
        Ok(())
    }
}

/// Parse output that must be exactly one non-blank line holding an integer
fn parse_single_integer(output: &str) -> DbResult<u64> {
    let malformed = || DbError::MalformedVersion {
        output: output.to_string(),
    };
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let value = lines.next().ok_or_else(malformed)?;
    if lines.next().is_some() {
        return Err(malformed());
    }
    value.parse::<u64>().map_err(|_| malformed())
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
