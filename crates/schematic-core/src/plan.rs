//! Upgrade planning: which migrations are pending, in what order

use crate::catalog::Catalog;
use crate::migration::Migration;

/// Pending migrations for one run, ascending by version.
///
/// The ceiling is kept alongside the full pending list rather than used to
/// filter it, so the applier can report the first migration it held back.
#[derive(Debug, Clone)]
pub struct UpgradePlan<'a> {
    current_version: u64,
    ceiling: Option<u64>,
    pending: Vec<&'a Migration>,
}

impl<'a> UpgradePlan<'a> {
    /// Select every migration newer than `current_version`
    pub fn new(current_version: u64, catalog: &'a Catalog, ceiling: Option<u64>) -> Self {
        // Catalog iteration is already ascending; gaps between versions are fine.
        let pending = catalog
            .iter()
            .filter(|m| m.version > current_version)
            .collect();
        Self {
            current_version,
            ceiling,
            pending,
        }
    }

    /// Version the plan was computed against
    pub fn current_version(&self) -> u64 {
        self.current_version
    }

    /// Maximum version this run may apply
    pub fn ceiling(&self) -> Option<u64> {
        self.ceiling
    }

    /// Every pending migration, ignoring the ceiling
    pub fn pending(&self) -> &[&'a Migration] {
        &self.pending
    }

    /// Whether `version` is allowed by the ceiling
    pub fn allows(&self, version: u64) -> bool {
        self.ceiling.map_or(true, |max| version <= max)
    }

    /// Prefix of the pending list that the ceiling allows
    pub fn within_ceiling(&self) -> impl Iterator<Item = &'a Migration> + '_ {
        self.pending
            .iter()
            .copied()
            .take_while(|m| self.allows(m.version))
    }

    /// First pending migration above the ceiling
    pub fn held_back(&self) -> Option<&'a Migration> {
        self.pending
            .iter()
            .copied()
            .find(|m| !self.allows(m.version))
    }

    /// Highest version the ceiling allows, if anything is pending
    pub fn target_version(&self) -> Option<u64> {
        self.within_ceiling().last().map(|m| m.version)
    }

    /// Whether nothing would be applied
    pub fn is_empty(&self) -> bool {
        self.within_ceiling().next().is_none()
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
