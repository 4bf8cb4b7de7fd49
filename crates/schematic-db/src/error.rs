//! Error types for schematic-db

use thiserror::Error;

/// Database and external command errors
#[derive(Error, Debug)]
pub enum DbError {
    /// External command exited non-zero or wrote diagnostics (D001)
    #[error(
        "[D001] External command failed ({}): {command}{}",
        describe_exit(.exit_code),
        describe_output(.stdout, .stderr)
    )]
    ExternalFailure {
        command: String,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    /// Version table returned something other than one integer (D002)
    #[error("[D002] Malformed version data from tracking table: {output:?}")]
    MalformedVersion { output: String },

    /// Process could not be spawned or awaited (D003)
    #[error("[D003] Failed to run '{command}': {source}")]
    Process {
        command: String,
        source: std::io::Error,
    },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(0) => "exit 0 with diagnostics".to_string(),
        Some(code) => format!("exit {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn describe_output(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.trim().is_empty() {
        out.push_str("\n--- stdout ---\n");
        out.push_str(stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        out.push_str("\n--- stderr ---\n");
        out.push_str(stderr.trim_end());
    }
    out
}
