use crate::error::SqliteError;
use spatia::common::JournalMode;
use spatia::errors::SpatiaResult;
use spatia::open_helper::Connection;

/// A rusqlite connection driven by the shared open sequence.
///
/// The schema version header is the `user_version` pragma. Transactions are
/// started with `BEGIN IMMEDIATE` so a migration step takes the write lock
/// before it reads anything.
pub struct SqliteConnection {
    connection: rusqlite::Connection,
}

impl SqliteConnection {
    pub(crate) fn new(connection: rusqlite::Connection) -> Self {
        SqliteConnection { connection }
    }

    /// The underlying rusqlite connection, for queries the trait doesn't cover.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.connection
    }

    /// Journal mode SQLite reports for the main database, lowercased.
    pub fn current_journal_mode(&self) -> SpatiaResult<String> {
        let mode: String = self
            .connection
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .map_err(SqliteError::from)?;
        Ok(mode.to_lowercase())
    }
}

impl Connection for SqliteConnection {
    fn execute_batch(&mut self, sql: &str) -> SpatiaResult<()> {
        self.connection.execute_batch(sql).map_err(|err| {
            log::error!("Failed to execute statements: {}", err);
            SqliteError::from(err).into()
        })
    }

    fn version(&mut self) -> SpatiaResult<u32> {
        let version: i64 = self
            .connection
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(SqliteError::from)?;
        u32::try_from(version).map_err(|_| {
            log::error!("Version header {} is out of range", version);
            SqliteError::InvalidVersion(version).into()
        })
    }

    fn set_version(&mut self, version: u32) -> SpatiaResult<()> {
        self.connection
            .pragma_update(None, "user_version", version)
            .map_err(|err| {
                log::error!("Failed to write version header {}: {}", version, err);
                SqliteError::from(err).into()
            })
    }

    fn begin_transaction(&mut self) -> SpatiaResult<()> {
        if self.in_transaction() {
            log::error!("Cannot begin a transaction while another one is open");
            return Err(SqliteError::NestedTransaction.into());
        }
        self.execute_batch("BEGIN IMMEDIATE;")
    }

    fn commit(&mut self) -> SpatiaResult<()> {
        self.execute_batch("COMMIT;")
    }

    fn rollback(&mut self) -> SpatiaResult<()> {
        self.execute_batch("ROLLBACK;")
    }

    fn in_transaction(&self) -> bool {
        !self.connection.is_autocommit()
    }

    fn table_exists(&mut self, table_name: &str) -> SpatiaResult<bool> {
        let count: i64 = self
            .connection
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(SqliteError::from)?;
        Ok(count > 0)
    }

    fn load_extension(&mut self, library: &str, entry_point: Option<&str>) -> SpatiaResult<()> {
        // SAFETY: extension loading stays enabled only while the guard lives,
        // and the library is the one the application configured.
        let result = unsafe {
            rusqlite::LoadExtensionGuard::new(&self.connection)
                .and_then(|_guard| self.connection.load_extension(library, entry_point))
        };
        result.map_err(|err| {
            log::error!("Failed to load extension {}: {}", library, err);
            SqliteError::from(err).into()
        })
    }

    fn set_journal_mode(&mut self, journal_mode: JournalMode) -> SpatiaResult<()> {
        let requested = journal_mode.pragma_value().ok_or_else(|| {
            log::error!("Journal mode {} must be resolved before it is applied", journal_mode);
            SqliteError::UnresolvedJournalMode(journal_mode)
        })?;

        let applied: String = self
            .connection
            .pragma_update_and_check(None, "journal_mode", requested, |row| row.get(0))
            .map_err(|err| {
                log::error!("Failed to set journal mode {}: {}", requested, err);
                SqliteError::from(err)
            })?;

        if !applied.eq_ignore_ascii_case(requested) {
            log::warn!("Requested journal mode {} but SQLite is using {}", requested, applied);
        }
        Ok(())
    }
}
