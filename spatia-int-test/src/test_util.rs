use parking_lot::Mutex;
use spatia::common::{Context, DatabaseCallback};
use spatia::errors::{ErrorKind, SpatiaError, SpatiaResult};
use spatia::open_helper::Connection;
use spatia::schema::DatabaseSchema;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(format!("spatia-{}", id))
}

pub fn cleanup(path: &Path) {
    if path.exists() {
        if let Err(err) = fs::remove_dir_all(path) {
            eprintln!("Warning: failed to clean up {}: {}", path.display(), err);
        }
    }
}

/// A scratch directory holding the databases (and assets) of one test.
/// Removed when dropped.
pub struct TestContext {
    dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = random_path();
        if let Err(err) = fs::create_dir_all(&dir) {
            panic!("Failed to create test directory {}: {}", dir.display(), err);
        }
        TestContext { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn context(&self) -> Context {
        Context::new(&self.dir).with_assets_dir(self.dir.join("assets"))
    }

    pub fn database_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Reads `user_version` straight from a database file.
    pub fn user_version(&self, name: &str) -> i64 {
        let connection = rusqlite::Connection::open(self.database_path(name)).unwrap();
        connection
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    /// Counts the rows of a table straight from a database file.
    pub fn count_rows(&self, name: &str, table: &str) -> i64 {
        let connection = rusqlite::Connection::open(self.database_path(name)).unwrap();
        connection
            .query_row(&format!("SELECT count(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    /// Whether a column exists, read straight from a database file.
    pub fn has_column(&self, name: &str, table: &str, column: &str) -> bool {
        let connection = rusqlite::Connection::open(self.database_path(name)).unwrap();
        let count: i64 = connection
            .query_row(
                &format!("SELECT count(*) FROM pragma_table_info('{}') WHERE name = ?1", table),
                [column],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        cleanup(&self.dir);
    }
}

/// Schema of a small places database.
///
/// Version 1 has `place(id, name)`. From version 2 on `place` also carries a
/// `rating` column, which is what validation checks for.
pub struct PlacesSchema {
    version: u32,
}

impl PlacesSchema {
    pub fn new(version: u32) -> Self {
        PlacesSchema { version }
    }
}

impl DatabaseSchema for PlacesSchema {
    fn version(&self) -> u32 {
        self.version
    }

    fn create_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        if self.version >= 2 {
            connection.execute_batch(
                "CREATE TABLE IF NOT EXISTS place (id INTEGER PRIMARY KEY, name TEXT NOT NULL, rating INTEGER);",
            )
        } else {
            connection.execute_batch("CREATE TABLE IF NOT EXISTS place (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
        }
    }

    fn drop_all_tables(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        connection.execute_batch("DROP TABLE IF EXISTS place;")
    }

    fn validate_schema(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        if connection.table_exists("place")? {
            Ok(())
        } else {
            Err(SpatiaError::new("table place is missing", ErrorKind::SchemaValidationFailed))
        }
    }
}

/// Records every lifecycle hook it sees as `"<tag>:<hook>"`.
#[derive(Clone)]
pub struct RecordingCallback {
    tag: String,
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingCallback {
    pub fn new(tag: &str, events: Arc<Mutex<Vec<String>>>) -> Self {
        RecordingCallback {
            tag: tag.to_string(),
            events,
        }
    }

    fn record(&self, hook: &str) {
        self.events.lock().push(format!("{}:{}", self.tag, hook));
    }
}

impl DatabaseCallback for RecordingCallback {
    fn on_create(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.record("create");
        Ok(())
    }

    fn on_open(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.record("open");
        Ok(())
    }

    fn on_destructive_migration(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.record("destructive");
        Ok(())
    }
}

pub fn events() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}
