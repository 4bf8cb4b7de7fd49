//! In-memory executors for tests.
//!
//! [`FakeDatabase`] understands exactly the statements [`VersionStore`]
//! emits, treats every call as one atomic unit, and records anything else as
//! migration payload. [`RecordingExecutor`] stands in for handler commands.
//!
//! [`VersionStore`]: crate::VersionStore

use crate::error::{DbError, DbResult};
use crate::traits::{CommandOutput, Executor};
use crate::version_store::{
    count_rows_sql, create_table_sql, insert_initial_sql, select_version_sql,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct FakeState {
    table_exists: bool,
    rows: Vec<u64>,
    payloads: Vec<String>,
}

/// Database client double holding a single tracking table
#[derive(Debug)]
pub struct FakeDatabase {
    table: String,
    state: Mutex<FakeState>,
    calls: Mutex<Vec<String>>,
    fail_marker: Option<String>,
}

impl FakeDatabase {
    /// Database where `table` does not exist yet
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            state: Mutex::new(FakeState::default()),
            calls: Mutex::new(Vec::new()),
            fail_marker: None,
        }
    }

    /// Database whose tracking table already holds `version`
    pub fn with_version(table: &str, version: u64) -> Self {
        let db = Self::new(table);
        db.set_rows(vec![version]);
        db
    }

    /// Fail any payload statement containing `marker`
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Replace the tracking table rows
    pub fn set_rows(&self, rows: Vec<u64>) {
        let mut state = self.state();
        state.table_exists = true;
        state.rows = rows;
    }

    /// Version in the single tracking row, `None` if there isn't exactly one
    pub fn version(&self) -> Option<u64> {
        match self.state().rows.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Whether the tracking table has been created
    pub fn table_exists(&self) -> bool {
        self.state().table_exists
    }

    /// Committed payload statements, in order
    pub fn payloads(&self) -> Vec<String> {
        self.state().payloads.clone()
    }

    /// Raw input of every call, including failed ones
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn execute(&self, state: &mut FakeState, stmt: &str, out: &mut String) -> Result<(), String> {
        let table = self.table.as_str();
        let update_prefix = format!("UPDATE {table} SET version = ");

        if stmt.eq_ignore_ascii_case("BEGIN") || stmt.eq_ignore_ascii_case("COMMIT") {
            return Ok(());
        }
        if stmt == statement(&count_rows_sql(table)) {
            require_table(state)?;
            out.push_str(&format!("{}\n", state.rows.len()));
        } else if stmt == statement(&create_table_sql(table)) {
            if state.table_exists {
                return Err(format!("table {table} already exists"));
            }
            state.table_exists = true;
        } else if stmt == statement(&insert_initial_sql(table)) {
            require_table(state)?;
            state.rows.push(0);
        } else if stmt == statement(&select_version_sql(table)) {
            require_table(state)?;
            for row in &state.rows {
                out.push_str(&format!("{row}\n"));
            }
        } else if let Some(rest) = stmt.strip_prefix(update_prefix.as_str()) {
            require_table(state)?;
            let version: u64 = rest
                .trim()
                .parse()
                .map_err(|_| format!("bad version in statement: {stmt}"))?;
            for row in state.rows.iter_mut() {
                *row = version;
            }
        } else {
            if let Some(marker) = &self.fail_marker {
                if stmt.contains(marker.as_str()) {
                    return Err(format!("statement failed: {stmt}"));
                }
            }
            state.payloads.push(stmt.to_string());
        }
        Ok(())
    }
}

/// Generated SQL as it appears after splitting on `;`
fn statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';')
}

fn require_table(state: &FakeState) -> Result<(), String> {
    if state.table_exists {
        Ok(())
    } else {
        Err("table doesn't exist".to_string())
    }
}

#[async_trait]
impl Executor for FakeDatabase {
    async fn run(&self, command: &str, input: Option<&str>) -> DbResult<CommandOutput> {
        let input = input.unwrap_or_default();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(input.to_string());

        let mut guard = self.state();
        let mut staged = guard.clone();
        let mut out = String::new();
        for stmt in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if let Err(message) = self.execute(&mut staged, stmt, &mut out) {
                return Err(DbError::ExternalFailure {
                    command: command.to_string(),
                    stdout: String::new(),
                    stderr: format!("ERROR: {message}\n"),
                    exit_code: Some(1),
                });
            }
        }
        *guard = staged;
        Ok(CommandOutput {
            stdout: out,
            exit_code: Some(0),
        })
    }
}

/// Handler command double that records every invocation
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<String>>,
    fail_marker: Option<String>,
}

impl RecordingExecutor {
    /// Executor where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail (exit 1) any command containing `marker`
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Commands run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn run(&self, command: &str, _input: Option<&str>) -> DbResult<CommandOutput> {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.to_string());

        if self
            .fail_marker
            .as_deref()
            .is_some_and(|marker| command.contains(marker))
        {
            return Err(DbError::ExternalFailure {
                command: command.to_string(),
                stdout: String::new(),
                stderr: "handler failed\n".to_string(),
                exit_code: Some(1),
            });
        }
        Ok(CommandOutput {
            stdout: format!("ran {command}\n"),
            exit_code: Some(0),
        })
    }
}
