use super::connection::{InMemoryConnection, InMemoryDatabaseState};
use crate::common::IN_MEMORY_NAME_PREFIX;
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::open_helper::{
    connection_ref, drive_open, Connection, ConnectionRef, OpenHelper, OpenHelperConfiguration,
    OpenHelperFactoryProvider, OpenHelperProvider,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type StateRef = Arc<Mutex<InMemoryDatabaseState>>;

/// Factory of the in-memory engine.
///
/// Named databases keep their state, version header included, for as long as
/// the factory (or any clone of it) lives, so closing and rebuilding a
/// database with the same factory behaves like reopening a file. Anonymous
/// in-memory databases are discarded when their helper closes.
#[derive(Clone, Default)]
pub struct InMemoryOpenHelperFactory {
    databases: Arc<Mutex<HashMap<String, StateRef>>>,
}

impl InMemoryOpenHelperFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the named database, if it was ever opened.
    pub fn snapshot(&self, name: &str) -> Option<InMemoryDatabaseState> {
        self.databases.lock().get(name).map(|state| state.lock().clone())
    }

    /// Overwrites the version header of a named database, creating it when
    /// needed. Lets tests start from an existing database.
    pub fn seed_version(&self, name: &str, version: u32) {
        let state = self.state_for(name);
        state.lock().version = version;
    }

    fn state_for(&self, key: &str) -> StateRef {
        self.databases
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

impl OpenHelperFactoryProvider for InMemoryOpenHelperFactory {
    fn create(&self, config: OpenHelperConfiguration) -> SpatiaResult<OpenHelper> {
        let key = match config.name() {
            Some(name) => name.to_string(),
            None => format!("{}{}", IN_MEMORY_NAME_PREFIX, uuid::Uuid::new_v4()),
        };

        Ok(OpenHelper::new(InMemoryOpenHelper {
            factory: self.clone(),
            key,
            config,
            connection: Mutex::new(None),
        }))
    }
}

/// Open helper of the in-memory engine.
pub struct InMemoryOpenHelper {
    factory: InMemoryOpenHelperFactory,
    key: String,
    config: OpenHelperConfiguration,
    connection: Mutex<Option<ConnectionRef>>,
}

impl OpenHelperProvider for InMemoryOpenHelper {
    fn database_name(&self) -> Option<String> {
        self.config.name().map(str::to_string)
    }

    fn writable_connection(&self) -> SpatiaResult<ConnectionRef> {
        let mut guard = self.connection.lock();
        if let Some(connection) = guard.as_ref() {
            return Ok(connection.clone());
        }

        let mut connection = InMemoryConnection::with_state(self.factory.state_for(&self.key));
        drive_open(&mut connection, &self.config)?;
        if connection.in_transaction() {
            log::error!("Open sequence left a transaction open on {}", self.key);
            return Err(SpatiaError::new(
                "Open sequence left a transaction open",
                ErrorKind::InternalError,
            ));
        }

        let connection = connection_ref(connection);
        *guard = Some(connection.clone());
        Ok(connection)
    }

    fn is_open(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn close(&self) -> SpatiaResult<()> {
        self.connection.lock().take();
        if self.config.is_in_memory() {
            self.factory.databases.lock().remove(&self.key);
        }
        Ok(())
    }
}
