//! Outcome of a migration run

use serde::Serialize;
use std::time::Duration;

/// One migration that was applied (or marked applied) during a run
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    /// Migration version
    pub version: u64,

    /// File name of the migration
    pub file: String,

    /// `sql` for native migrations, the extension for handled ones
    pub kind: String,

    /// Time spent applying, zero when faked
    #[serde(skip)]
    pub duration: Duration,

    /// Handler output shown to the operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Why a run stopped walking the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "version")]
pub enum StopReason {
    /// Every pending migration was handled
    Exhausted,
    /// The next pending migration is above the ceiling
    Ceiling(u64),
}

/// Summary of one run of the applier
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Version marker before the run
    pub starting_version: u64,

    /// Version marker after the run
    pub final_version: u64,

    /// Migrations applied, ascending
    pub applied: Vec<AppliedMigration>,

    /// Whether payloads were skipped (fake mode)
    pub faked: bool,

    /// Why the run stopped
    pub stopped: StopReason,
}

impl ApplyReport {
    /// Report for a run that has not applied anything yet
    pub(crate) fn starting_at(version: u64, faked: bool) -> Self {
        Self {
            starting_version: version,
            final_version: version,
            applied: Vec::new(),
            faked,
            stopped: StopReason::Exhausted,
        }
    }

    /// Whether the run changed the version marker
    pub fn changed(&self) -> bool {
        self.final_version != self.starting_version
    }

    /// Versions applied, ascending
    pub fn applied_versions(&self) -> Vec<u64> {
        self.applied.iter().map(|m| m.version).collect()
    }
}
