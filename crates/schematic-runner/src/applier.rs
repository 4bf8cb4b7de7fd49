//! Migration application
//!
//! The applier reads the version marker, plans against the catalog, and then
//! applies pending migrations strictly one at a time in ascending order. Any
//! failure aborts the run; migrations committed before it stay committed.
//!
//! Native migrations are sent to the database client together with their
//! version bump as one transaction. Handled migrations run an external
//! command and bump the marker in a separate call afterwards, so a crash in
//! between re-runs the handler on the next invocation.

use crate::error::{RunnerError, RunnerResult};
use crate::report::{AppliedMigration, ApplyReport, StopReason};
use schematic_core::{Catalog, Config, CoreError, Migration, MigrationKind, UpgradePlan};
use schematic_db::{Executor, VersionStore};
use std::time::{Duration, Instant};

/// Applies migrations from a catalog through a database and a handler executor
pub struct Applier<'a> {
    store: VersionStore<'a>,
    handlers: &'a dyn Executor,
}

impl<'a> Applier<'a> {
    /// Create an applier.
    ///
    /// `database` runs the configured client command; `handlers` runs
    /// handler command lines.
    pub fn new(config: &'a Config, database: &'a dyn Executor, handlers: &'a dyn Executor) -> Self {
        Self {
            store: VersionStore::from_config(database, config),
            handlers,
        }
    }

    /// Ensure the tracking table and read the current version
    pub async fn current_version(&self) -> RunnerResult<u64> {
        self.store.ensure_table().await?;
        Ok(self.store.read_version().await?)
    }

    /// Overwrite the version marker without running any migration
    pub async fn force_version(&self, version: u64) -> RunnerResult<()> {
        self.store.ensure_table().await?;
        self.store.write_version(version).await?;
        log::info!("Version marker set to {version}");
        Ok(())
    }

    /// Compute the plan against the current version
    pub async fn plan<'c>(
        &self,
        catalog: &'c Catalog,
        ceiling: Option<u64>,
    ) -> RunnerResult<UpgradePlan<'c>> {
        let current = self.current_version().await?;
        Ok(UpgradePlan::new(current, catalog, ceiling))
    }

    /// Compute the plan without touching the tracking table.
    ///
    /// A database that has never been migrated is treated as version 0.
    pub async fn preview<'c>(
        &self,
        catalog: &'c Catalog,
        ceiling: Option<u64>,
    ) -> RunnerResult<UpgradePlan<'c>> {
        let current = self.store.peek_version().await?.unwrap_or(0);
        Ok(UpgradePlan::new(current, catalog, ceiling))
    }

    /// Apply every pending migration up to `ceiling`
    pub async fn run_upgrades(
        &self,
        catalog: &Catalog,
        ceiling: Option<u64>,
    ) -> RunnerResult<ApplyReport> {
        let plan = self.plan(catalog, ceiling).await?;
        let mut report = ApplyReport::starting_at(plan.current_version(), false);

        if plan.pending().is_empty() {
            log::info!("Already at version {}", plan.current_version());
            return Ok(report);
        }

        for migration in plan.pending() {
            if !plan.allows(migration.version) {
                log::info!(
                    "Stopping before migration {}: above maximum version {}",
                    migration.version,
                    plan.ceiling().unwrap_or_default()
                );
                report.stopped = StopReason::Ceiling(migration.version);
                break;
            }

            let applied = self.apply(migration).await?;
            report.final_version = migration.version;
            report.applied.push(applied);
        }

        Ok(report)
    }

    /// Mark everything pending up to `ceiling` as applied without running it
    pub async fn fake_upgrades(
        &self,
        catalog: &Catalog,
        ceiling: Option<u64>,
    ) -> RunnerResult<ApplyReport> {
        let plan = self.plan(catalog, ceiling).await?;
        let mut report = ApplyReport::starting_at(plan.current_version(), true);
        if let Some(held) = plan.held_back() {
            report.stopped = StopReason::Ceiling(held.version);
        }

        let Some(target) = plan.target_version() else {
            log::info!("Nothing to mark as applied");
            return Ok(report);
        };

        self.store.write_version(target).await?;
        log::info!("Marked migrations through {target} as applied without running them");

        report.final_version = target;
        report.applied = plan
            .within_ceiling()
            .map(|m| AppliedMigration {
                version: m.version,
                file: m.file_name().to_string(),
                kind: m.kind.label().to_string(),
                duration: Duration::ZERO,
                output: None,
            })
            .collect();
        Ok(report)
    }

    /// Apply a single migration and advance the marker to its version
    async fn apply(&self, migration: &Migration) -> RunnerResult<AppliedMigration> {
        let start = Instant::now();
        log::info!("Applying migration {}: {}", migration.version, migration.file_name());

        let output = match &migration.kind {
            MigrationKind::Native => {
                self.apply_native(migration).await?;
                None
            }
            MigrationKind::Handled { .. } => Some(self.apply_handled(migration).await?),
            MigrationKind::Unsupported { .. } => {
                return Err(CoreError::UnsupportedMigrationType {
                    path: migration.path.display().to_string(),
                }
                .into());
            }
        };

        let duration = start.elapsed();
        log::debug!(
            "Migration {} finished in {:.2}s",
            migration.version,
            duration.as_secs_f64()
        );
        Ok(AppliedMigration {
            version: migration.version,
            file: migration.file_name().to_string(),
            kind: migration.kind.label().to_string(),
            duration,
            output,
        })
    }

    async fn apply_native(&self, migration: &Migration) -> RunnerResult<()> {
        let sql =
            std::fs::read_to_string(&migration.path).map_err(|e| RunnerError::ReadMigration {
                path: migration.path.display().to_string(),
                source: e,
            })?;

        self.store
            .apply_with_version_bump(&sql, migration.version)
            .await
            .map_err(|e| failed(migration, e))
    }

    async fn apply_handled(&self, migration: &Migration) -> RunnerResult<String> {
        let Some(command) = migration.handler_command() else {
            return Err(CoreError::UnsupportedMigrationType {
                path: migration.path.display().to_string(),
            }
            .into());
        };

        let output = self
            .handlers
            .run(&command, None)
            .await
            .map_err(|e| failed(migration, e))?;

        // Not atomic with the handler: a crash here re-runs it next time.
        self.store
            .write_version(migration.version)
            .await
            .map_err(|e| failed(migration, e))?;
        Ok(output.stdout)
    }
}

fn failed(migration: &Migration, source: schematic_db::DbError) -> RunnerError {
    RunnerError::MigrationFailed {
        version: migration.version,
        file: migration.file_name().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
