use crate::common::JournalMode;
use crate::errors::SpatiaResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// A physical connection to a database.
///
/// Implemented by every engine. The open sequence drives schema creation,
/// migrations and callbacks exclusively through this trait.
pub trait Connection: Send {
    /// Executes one or more `;`-separated statements that return no rows.
    fn execute_batch(&mut self, sql: &str) -> SpatiaResult<()>;

    /// Reads the persisted schema version header. `0` means no header.
    fn version(&mut self) -> SpatiaResult<u32>;

    /// Writes the persisted schema version header.
    fn set_version(&mut self, version: u32) -> SpatiaResult<()>;

    fn begin_transaction(&mut self) -> SpatiaResult<()>;

    fn commit(&mut self) -> SpatiaResult<()>;

    fn rollback(&mut self) -> SpatiaResult<()>;

    fn in_transaction(&self) -> bool;

    fn table_exists(&mut self, table_name: &str) -> SpatiaResult<bool>;

    /// Loads a loadable extension library into this connection.
    fn load_extension(&mut self, library: &str, entry_point: Option<&str>) -> SpatiaResult<()>;

    /// Applies a resolved journal mode. `Automatic` is rejected.
    fn set_journal_mode(&mut self, journal_mode: JournalMode) -> SpatiaResult<()>;
}

/// Shared handle to the connection an open helper keeps open.
pub type ConnectionRef = Arc<Mutex<Box<dyn Connection>>>;

pub fn connection_ref<C: Connection + 'static>(connection: C) -> ConnectionRef {
    Arc::new(Mutex::new(Box::new(connection)))
}

/// Runs `work` inside a transaction.
///
/// Commits when `work` succeeds. Otherwise rolls back and returns the error
/// from `work`; a failing rollback is logged and does not mask it.
pub fn with_transaction<T, F>(connection: &mut dyn Connection, work: F) -> SpatiaResult<T>
where
    F: FnOnce(&mut dyn Connection) -> SpatiaResult<T>,
{
    connection.begin_transaction()?;
    match work(connection) {
        Ok(value) => {
            connection.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = connection.rollback() {
                log::error!("Failed to roll back transaction: {}", rollback_err);
            }
            Err(err)
        }
    }
}
