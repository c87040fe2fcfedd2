use crate::errors::SpatiaResult;
use crate::open_helper::Connection;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Transform applied by a migration.
pub type MigrationFn = Arc<dyn Fn(&mut dyn Connection) -> SpatiaResult<()> + Send + Sync>;

/// A registered transform between two specific schema versions.
///
/// # Purpose
/// A migration is identified by its `(start_version, end_version)` pair. Its
/// transform runs inside a transaction opened by the open sequence, so it
/// must not commit or roll back on its own.
///
/// # Characteristics
/// - Immutable once created
/// - Cheap to clone (the transform is shared)
/// - Versions may move in either direction; a start greater than the end
///   describes a downgrade
///
/// # Examples
///
/// ```rust
/// use spatia::migration::Migration;
///
/// let migration = Migration::new(1, 2, |conn| {
///     conn.execute_batch("ALTER TABLE place ADD COLUMN rating INTEGER;")
/// });
/// assert_eq!(migration.start_version(), 1);
/// assert_eq!(migration.end_version(), 2);
/// ```
#[derive(Clone)]
pub struct Migration {
    start_version: u32,
    end_version: u32,
    migrate: MigrationFn,
}

impl Migration {
    pub fn new<F>(start_version: u32, end_version: u32, migrate: F) -> Self
    where
        F: Fn(&mut dyn Connection) -> SpatiaResult<()> + Send + Sync + 'static,
    {
        Migration {
            start_version,
            end_version,
            migrate: Arc::new(migrate),
        }
    }

    pub fn start_version(&self) -> u32 {
        self.start_version
    }

    pub fn end_version(&self) -> u32 {
        self.end_version
    }

    /// Returns `true` when this migration moves the schema to a lower version.
    pub fn is_downgrade(&self) -> bool {
        self.end_version < self.start_version
    }

    /// Runs the transform against an open transaction.
    pub fn migrate(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        (self.migrate)(connection)
    }
}

impl Debug for Migration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("start_version", &self.start_version)
            .field("end_version", &self.end_version)
            .field("migrate", &"<fn>")
            .finish()
    }
}
