use crate::config::SqliteConfig;
use crate::connection::SqliteConnection;
use crate::error::SqliteError;
use log::{error, info};
use parking_lot::Mutex;
use spatia::errors::{ErrorKind, SpatiaError, SpatiaResult};
use spatia::open_helper::{
    connection_ref, drive_open, Connection, ConnectionRef, OpenHelper, OpenHelperConfiguration,
    OpenHelperFactoryProvider, OpenHelperProvider,
};
use std::time::Instant;

/// Open-helper factory backed by SQLite.
///
/// File databases are opened at the configuration's path, creating missing
/// parent directories. A configuration without a path gets a private
/// in-memory database that disappears when the helper closes.
#[derive(Clone, Default)]
pub struct SqliteOpenHelperFactory {
    config: SqliteConfig,
}

impl SqliteOpenHelperFactory {
    pub fn new(config: SqliteConfig) -> Self {
        SqliteOpenHelperFactory { config }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl OpenHelperFactoryProvider for SqliteOpenHelperFactory {
    fn create(&self, config: OpenHelperConfiguration) -> SpatiaResult<OpenHelper> {
        Ok(OpenHelper::new(SqliteOpenHelper {
            sqlite_config: self.config.clone(),
            config,
            connection: Mutex::new(None),
        }))
    }
}

/// Open helper of the SQLite engine. Keeps one writable connection.
pub struct SqliteOpenHelper {
    sqlite_config: SqliteConfig,
    config: OpenHelperConfiguration,
    connection: Mutex<Option<ConnectionRef>>,
}

impl SqliteOpenHelper {
    fn mode(&self) -> &'static str {
        if self.config.is_in_memory() {
            "memory"
        } else {
            "file"
        }
    }

    fn open_connection(&self) -> SpatiaResult<SqliteConnection> {
        let connection = match self.config.path() {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                rusqlite::Connection::open(path)
            }
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(SqliteError::from)?;

        Ok(SqliteConnection::new(connection))
    }

    fn bootstrap(&self, connection: &mut SqliteConnection) -> SpatiaResult<()> {
        // bundled builds may compile foreign keys on by default
        connection
            .raw()
            .pragma_update(None, "foreign_keys", self.sqlite_config.foreign_keys())
            .map_err(SqliteError::from)?;
        connection
            .raw()
            .busy_timeout(self.sqlite_config.busy_timeout())
            .map_err(SqliteError::from)?;

        drive_open(connection, &self.config)?;
        if connection.in_transaction() {
            return Err(SpatiaError::new(
                "Open sequence left a transaction open",
                ErrorKind::InternalError,
            ));
        }
        Ok(())
    }
}

impl OpenHelperProvider for SqliteOpenHelper {
    fn database_name(&self) -> Option<String> {
        self.config.name().map(str::to_string)
    }

    fn writable_connection(&self) -> SpatiaResult<ConnectionRef> {
        let mut guard = self.connection.lock();
        if let Some(connection) = guard.as_ref() {
            return Ok(connection.clone());
        }

        let started_at = Instant::now();
        let mode = self.mode();
        info!("event=db_open module=sqlite status=start mode={}", mode);

        let mut connection = match self.open_connection() {
            Ok(connection) => connection,
            Err(err) => {
                error!(
                    "event=db_open module=sqlite status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        if let Err(err) = self.bootstrap(&mut connection) {
            error!(
                "event=db_open module=sqlite status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        info!(
            "event=db_open module=sqlite status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        );
        let connection = connection_ref(connection);
        *guard = Some(connection.clone());
        Ok(connection)
    }

    fn is_open(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn close(&self) -> SpatiaResult<()> {
        if self.connection.lock().take().is_some() {
            info!("event=db_close module=sqlite status=ok mode={}", self.mode());
        }
        Ok(())
    }
}
