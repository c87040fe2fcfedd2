//! The opened database handle.

use crate::common::{Executor, SerialExecutor};
use crate::database_config::DatabaseConfiguration;
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::open_helper::{with_transaction, Connection, ConnectionRef, OpenHelper, OpenHelperConfiguration};
use crate::schema::DatabaseSchema;
use crate::schema_callback::SchemaOpenCallback;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A built database.
///
/// # Purpose
/// Owns the frozen [`DatabaseConfiguration`] and the engine's open helper.
/// Building a database performs no I/O: the first call to
/// [`connection`](Database::connection) or
/// [`run_in_transaction`](Database::run_in_transaction) opens it, which
/// reconciles the persisted version header with the schema version and runs
/// the lifecycle callbacks. Concurrent first requests open the database once.
///
/// # Characteristics
/// - Cheap to clone; clones share the same database
/// - A failed open caches nothing, the next request retries
/// - Transactions submitted through [`transaction_executor`](Database::transaction_executor)
///   run one at a time, in submission order
pub struct Database<S: DatabaseSchema> {
    inner: Arc<DatabaseInner<S>>,
}

impl<S: DatabaseSchema + 'static> Database<S> {
    pub(crate) fn new(schema: Arc<S>, config: DatabaseConfiguration) -> SpatiaResult<Self> {
        let callback = Arc::new(SchemaOpenCallback::new(schema.clone(), config.clone()));
        let helper_config = OpenHelperConfiguration::new(
            config.name().map(str::to_string),
            config.path().map(|p| p.to_path_buf()),
            schema.version(),
            config.journal_mode(),
            callback,
        );
        let open_helper = config.open_helper_factory().create(helper_config)?;
        let transaction_executor: Arc<dyn Executor> =
            Arc::new(SerialExecutor::new(config.transaction_executor().clone()));

        Ok(Database {
            inner: Arc::new(DatabaseInner {
                schema,
                config,
                open_helper,
                transaction_executor,
                closed: AtomicBool::new(false),
            }),
        })
    }
}

impl<S: DatabaseSchema> Clone for Database<S> {
    fn clone(&self) -> Self {
        Database {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DatabaseSchema> Deref for Database<S> {
    type Target = DatabaseInner<S>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct DatabaseInner<S: DatabaseSchema> {
    schema: Arc<S>,
    config: DatabaseConfiguration,
    open_helper: OpenHelper,
    transaction_executor: Arc<dyn Executor>,
    closed: AtomicBool,
}

impl<S: DatabaseSchema> DatabaseInner<S> {
    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn configuration(&self) -> &DatabaseConfiguration {
        &self.config
    }

    pub fn open_helper(&self) -> &OpenHelper {
        &self.open_helper
    }

    /// Returns the writable connection, opening the database first if needed.
    pub fn connection(&self) -> SpatiaResult<ConnectionRef> {
        self.ensure_usable()?;
        self.open_helper.writable_connection()
    }

    /// Runs `work` in a transaction on the writable connection.
    ///
    /// Runs on the calling thread. Use
    /// [`transaction_executor`](DatabaseInner::transaction_executor) to run
    /// transactions in the background.
    pub fn run_in_transaction<T, F>(&self, work: F) -> SpatiaResult<T>
    where
        F: FnOnce(&mut dyn Connection) -> SpatiaResult<T>,
    {
        let connection = self.connection()?;
        let mut guard = connection.lock();
        with_transaction(&mut **guard, work)
    }

    /// Executor queries are dispatched on.
    pub fn query_executor(&self) -> Arc<dyn Executor> {
        self.config.query_executor().clone()
    }

    /// Executor transactions are dispatched on. Admits one task at a time.
    pub fn transaction_executor(&self) -> Arc<dyn Executor> {
        self.transaction_executor.clone()
    }

    /// Whether the database has been opened and not closed since.
    pub fn is_open(&self) -> bool {
        !self.is_closed() && self.open_helper.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the database. Later connection requests fail.
    pub fn close(&self) -> SpatiaResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        log::debug!(
            "Closing database {}",
            self.config.name().unwrap_or("in-memory database")
        );
        self.open_helper.close()
    }

    fn ensure_usable(&self) -> SpatiaResult<()> {
        if self.is_closed() {
            log::error!("Database is already closed");
            return Err(SpatiaError::new(
                "Database is already closed",
                ErrorKind::DatabaseClosed,
            ));
        }

        if !self.config.allow_main_thread_queries() && self.config.context().is_main_thread() {
            log::error!("Cannot access the database on the main thread");
            return Err(SpatiaError::new(
                "Cannot access the database on the main thread since it may potentially lock the \
                 UI for a long period of time",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
