//! Shell-backed executor built on `tokio::process`

use crate::error::{DbError, DbResult};
use crate::traits::{CommandOutput, DiagnosticPolicy, Executor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs commands through `sh -c`, one fresh process per call
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    policy: DiagnosticPolicy,
    working_dir: Option<PathBuf>,
}

impl ShellExecutor {
    /// Executor applying `policy` to every command it runs
    pub fn new(policy: DiagnosticPolicy) -> Self {
        Self {
            policy,
            working_dir: None,
        }
    }

    /// Executor for the database client: stderr output is an error
    pub fn database() -> Self {
        Self::new(DiagnosticPolicy::Strict)
    }

    /// Executor for handler commands: stderr is merged into stdout
    pub fn handler() -> Self {
        Self::new(DiagnosticPolicy::Merge)
    }

    /// Run every command from `dir`
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn run(&self, command: &str, input: Option<&str>) -> DbResult<CommandOutput> {
        log::debug!("Running: {command}");

        let script = match self.policy {
            DiagnosticPolicy::Strict => command.to_string(),
            // Point the shell's stderr at the stdout pipe before the command runs
            DiagnosticPolicy::Merge => format!("exec 2>&1\n{command}"),
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&script)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let process_err = |source: std::io::Error| DbError::Process {
            command: command.to_string(),
            source,
        };

        let mut child = cmd.spawn().map_err(process_err)?;

        // Feed stdin while draining stdout/stderr so a chatty child can't
        // block on a full pipe before it has read all of its input.
        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(process_err)?;
        match fed {
            // The child may legitimately exit without reading its input.
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(process_err(e));
            }
            _ => {}
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        classify(self.policy, command, stdout, stderr, exit_code, output.status.success())
    }
}

/// Decide success or failure from a finished process
fn classify(
    policy: DiagnosticPolicy,
    command: &str,
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    success: bool,
) -> DbResult<CommandOutput> {
    let failed = match policy {
        DiagnosticPolicy::Strict => !success || !stderr.is_empty(),
        DiagnosticPolicy::Merge => !success,
    };
    if failed {
        return Err(DbError::ExternalFailure {
            command: command.to_string(),
            stdout,
            stderr,
            exit_code,
        });
    }

    Ok(CommandOutput { stdout, exit_code })
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
