use super::container::MigrationContainer;
use super::migration::Migration;
use super::policy::DestructiveFallbackPolicy;
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};

/// Outcome of reconciling a persisted version with the schema version.
#[derive(Clone, Debug)]
pub enum ResolvedPlan {
    /// The versions already match.
    NoOp,
    /// Apply these migrations in order.
    Migrate(Vec<Migration>),
    /// Drop and recreate every managed table.
    DestructiveRecreate,
}

impl ResolvedPlan {
    pub fn is_noop(&self) -> bool {
        matches!(self, ResolvedPlan::NoOp)
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, ResolvedPlan::DestructiveRecreate)
    }

    /// The `(start, end)` pairs of a migration plan, empty otherwise.
    pub fn steps(&self) -> Vec<(u32, u32)> {
        match self {
            ResolvedPlan::Migrate(path) => path
                .iter()
                .map(|m| (m.start_version(), m.end_version()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Turns a migration container and a fallback policy into a plan.
///
/// The resolver holds only borrowed, read-only state, so it is reentrant and
/// can run on any thread.
pub struct MigrationResolver<'a> {
    migrations: &'a MigrationContainer,
    fallback: &'a DestructiveFallbackPolicy,
}

impl<'a> MigrationResolver<'a> {
    pub fn new(migrations: &'a MigrationContainer, fallback: &'a DestructiveFallbackPolicy) -> Self {
        MigrationResolver { migrations, fallback }
    }

    /// Resolves the plan taking the database from `current` to `target`.
    ///
    /// The path search never backtracks: once the widest jump from a version
    /// is taken, narrower jumps from that version are not tried. With `1 -> 3`,
    /// `1 -> 2` and `2 -> 4` registered, resolving `1 -> 4` takes `1 -> 3`, gets
    /// stuck at 3 and reports no path even though `1 -> 2 -> 4` would reach
    /// the target.
    pub fn resolve(&self, current: u32, target: u32) -> SpatiaResult<ResolvedPlan> {
        if current == target {
            return Ok(ResolvedPlan::NoOp);
        }

        if let Some(path) = self.find_migration_path(current, target) {
            log::debug!(
                "Migrating from version {} to {} in {} step(s)",
                current,
                target,
                path.len()
            );
            return Ok(ResolvedPlan::Migrate(path));
        }

        if self.fallback.allows_recreate(current, target) {
            log::debug!(
                "No migration path from version {} to {}, falling back to destructive recreate",
                current,
                target
            );
            return Ok(ResolvedPlan::DestructiveRecreate);
        }

        let message = no_migration_path_message(current, target);
        log::error!("{}", message);
        Err(SpatiaError::new(&message, ErrorKind::NoMigrationPath))
    }

    /// Walks from `start` toward `end`, taking the widest jump that does not
    /// pass `end` at every node. Returns `None` when the walk gets stuck.
    fn find_migration_path(&self, start: u32, end: u32) -> Option<Vec<Migration>> {
        let upgrade = end > start;
        let mut result = Vec::new();
        let mut current = start;

        while current != end {
            let targets = self.migrations.migrations_from(current)?;

            let target = if upgrade {
                // largest target that does not exceed end
                targets
                    .keys()
                    .filter(|&&t| t > current && t <= end)
                    .max()
                    .copied()
            } else {
                // smallest target that does not go below end
                targets
                    .keys()
                    .filter(|&&t| t < current && t >= end)
                    .min()
                    .copied()
            }?;

            result.push(targets.get(&target)?.clone());
            current = target;
        }

        Some(result)
    }
}

fn no_migration_path_message(current: u32, target: u32) -> String {
    format!(
        "A migration from {} to {} was required but not found. Please provide the \
         necessary migration path via DatabaseBuilder::add_migration or allow for \
         destructive migrations via one of the DatabaseBuilder::fallback_to_destructive_migration* \
         methods.",
        current, target
    )
}
