//! The database definition implemented by applications.

use crate::errors::SpatiaResult;
use crate::open_helper::Connection;

/// Describes the tables a database manages and the schema version they
/// belong to.
///
/// # Purpose
/// The schema is what the builder is generic over. The open sequence uses it
/// to create managed tables on a fresh database, to drop and recreate them on
/// a destructive fallback, and to check the result after migrations ran.
///
/// # Examples
///
/// ```rust
/// use spatia::errors::SpatiaResult;
/// use spatia::open_helper::Connection;
/// use spatia::schema::DatabaseSchema;
///
/// struct PlacesSchema;
///
/// impl DatabaseSchema for PlacesSchema {
///     fn version(&self) -> u32 {
///         2
///     }
///
///     fn create_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
///         connection.execute_batch("CREATE TABLE IF NOT EXISTS place (id INTEGER PRIMARY KEY, name TEXT);")
///     }
///
///     fn drop_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
///         connection.execute_batch("DROP TABLE IF EXISTS place;")
///     }
/// }
/// ```
pub trait DatabaseSchema: Send + Sync {
    /// Version the application expects. Must be at least 1.
    fn version(&self) -> u32;

    /// Creates every managed table.
    fn create_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()>;

    /// Drops every managed table.
    fn drop_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()>;

    /// Checks the schema once the last migration step has committed.
    fn validate_schema(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }
}
