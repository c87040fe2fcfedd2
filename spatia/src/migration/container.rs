use super::migration::Migration;
use std::collections::{BTreeMap, BTreeSet};

/// Migrations indexed by start version, then end version.
///
/// Insertion order is irrelevant: the resolver reorders migrations through
/// its graph walk. Adding a second migration with an existing
/// `(start, end)` pair keeps the first and records the pair as a duplicate,
/// which the builder reports when it freezes the configuration.
#[derive(Clone, Default, Debug)]
pub struct MigrationContainer {
    migrations: BTreeMap<u32, BTreeMap<u32, Migration>>,
    duplicates: Vec<(u32, u32)>,
}

impl MigrationContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_migration(&mut self, migration: Migration) {
        let start = migration.start_version();
        let end = migration.end_version();
        let targets = self.migrations.entry(start).or_default();
        if targets.contains_key(&end) {
            log::warn!("Migration from {} to {} registered more than once", start, end);
            self.duplicates.push((start, end));
            return;
        }
        targets.insert(end, migration);
    }

    pub fn add_migrations(&mut self, migrations: impl IntoIterator<Item = Migration>) {
        for migration in migrations {
            self.add_migration(migration);
        }
    }

    /// Migrations starting at `start_version`, keyed by end version.
    pub fn migrations_from(&self, start_version: u32) -> Option<&BTreeMap<u32, Migration>> {
        self.migrations.get(&start_version)
    }

    pub fn get(&self, start_version: u32, end_version: u32) -> Option<&Migration> {
        self.migrations
            .get(&start_version)
            .and_then(|targets| targets.get(&end_version))
    }

    pub fn contains(&self, start_version: u32, end_version: u32) -> bool {
        self.get(start_version, end_version).is_some()
    }

    /// Pairs that were registered more than once, in registration order.
    pub fn duplicates(&self) -> &[(u32, u32)] {
        &self.duplicates
    }

    /// Every version that is the start or the end of some migration.
    pub fn endpoint_versions(&self) -> BTreeSet<u32> {
        self.migrations
            .iter()
            .flat_map(|(start, targets)| std::iter::once(*start).chain(targets.keys().copied()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
