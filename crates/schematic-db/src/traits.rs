//! Executor trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// How an executor treats output on the child's diagnostic channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticPolicy {
    /// Any stderr output is a failure, whatever the exit code.
    ///
    /// Used for database clients, whose stdout is parsed as data.
    Strict,
    /// Stderr shares the stdout pipe, so diagnostics stay interleaved with
    /// output in the order the command printed them. Only the exit code
    /// decides success.
    ///
    /// Used for handler commands, whose output is only shown to the operator.
    Merge,
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output (with stderr interleaved under [`DiagnosticPolicy::Merge`])
    pub stdout: String,

    /// Exit code, `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
}

/// Runs command-line programs on behalf of the migration engine.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `command`, writing `input` (if any) to its stdin.
    ///
    /// Returns `DbError::ExternalFailure` when the command fails under the
    /// executor's diagnostic policy.
    async fn run(&self, command: &str, input: Option<&str>) -> DbResult<CommandOutput>;
}
