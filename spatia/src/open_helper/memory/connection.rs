use crate::common::JournalMode;
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::open_helper::Connection;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^CREATE\s+(?:TEMP\s+|TEMPORARY\s+|VIRTUAL\s+)?TABLE\s+(IF\s+NOT\s+EXISTS\s+)?[`\x22\[]?(\w+)")
        .expect("valid regex")
});

static DROP_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^DROP\s+TABLE\s+(IF\s+EXISTS\s+)?[`\x22\[]?(\w+)").expect("valid regex")
});

static ALTER_RENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^ALTER\s+TABLE\s+[`\x22\[]?(\w+)[`\x22\]]?\s+RENAME\s+TO\s+[`\x22\[]?(\w+)")
        .expect("valid regex")
});

/// Observable state of an in-memory database.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryDatabaseState {
    pub version: u32,
    pub tables: BTreeSet<String>,
    pub statements: Vec<String>,
    pub journal_mode: Option<JournalMode>,
    pub extensions: Vec<String>,
}

impl InMemoryDatabaseState {
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(&name.to_lowercase())
    }

    /// Number of recorded statements containing `fragment`, ignoring case.
    pub fn count_statements(&self, fragment: &str) -> usize {
        let fragment = fragment.to_lowercase();
        self.statements
            .iter()
            .filter(|s| s.to_lowercase().contains(&fragment))
            .count()
    }

    fn apply(&mut self, statement: &str) -> SpatiaResult<()> {
        if let Some(caps) = CREATE_TABLE.captures(statement) {
            let if_not_exists = caps.get(1).is_some();
            let table = caps[2].to_lowercase();
            if self.tables.contains(&table) {
                if !if_not_exists {
                    return Err(engine_error(&format!("table {} already exists", table)));
                }
            } else {
                self.tables.insert(table);
            }
        } else if let Some(caps) = DROP_TABLE.captures(statement) {
            let if_exists = caps.get(1).is_some();
            let table = caps[2].to_lowercase();
            if !self.tables.remove(&table) && !if_exists {
                return Err(engine_error(&format!("no such table: {}", table)));
            }
        } else if let Some(caps) = ALTER_RENAME.captures(statement) {
            let from = caps[1].to_lowercase();
            if !self.tables.remove(&from) {
                return Err(engine_error(&format!("no such table: {}", from)));
            }
            self.tables.insert(caps[2].to_lowercase());
        }

        self.statements.push(statement.to_string());
        Ok(())
    }
}

fn engine_error(message: &str) -> SpatiaError {
    log::error!("{}", message);
    SpatiaError::new(message, ErrorKind::EngineError)
}

/// Connection to an in-memory database.
///
/// Connections created by the same [`InMemoryOpenHelperFactory`](super::InMemoryOpenHelperFactory)
/// for the same name share state. A transaction snapshots the state on begin
/// and restores it on rollback.
pub struct InMemoryConnection {
    state: Arc<Mutex<InMemoryDatabaseState>>,
    snapshot: Option<InMemoryDatabaseState>,
}

impl InMemoryConnection {
    /// Opens a connection to a private, empty database.
    pub fn new() -> Self {
        Self::with_state(Arc::new(Mutex::new(InMemoryDatabaseState::default())))
    }

    pub(crate) fn with_state(state: Arc<Mutex<InMemoryDatabaseState>>) -> Self {
        InMemoryConnection { state, snapshot: None }
    }

    pub fn state(&self) -> InMemoryDatabaseState {
        self.state.lock().clone()
    }

    pub fn journal_mode(&self) -> Option<JournalMode> {
        self.state.lock().journal_mode
    }
}

impl Default for InMemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for InMemoryConnection {
    fn execute_batch(&mut self, sql: &str) -> SpatiaResult<()> {
        let mut state = self.state.lock();
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            state.apply(statement)?;
        }
        Ok(())
    }

    fn version(&mut self) -> SpatiaResult<u32> {
        Ok(self.state.lock().version)
    }

    fn set_version(&mut self, version: u32) -> SpatiaResult<()> {
        self.state.lock().version = version;
        Ok(())
    }

    fn begin_transaction(&mut self) -> SpatiaResult<()> {
        if self.snapshot.is_some() {
            return Err(engine_error("cannot start a transaction within a transaction"));
        }
        self.snapshot = Some(self.state.lock().clone());
        Ok(())
    }

    fn commit(&mut self) -> SpatiaResult<()> {
        match self.snapshot.take() {
            Some(_) => Ok(()),
            None => Err(engine_error("cannot commit - no transaction is active")),
        }
    }

    fn rollback(&mut self) -> SpatiaResult<()> {
        match self.snapshot.take() {
            Some(snapshot) => {
                *self.state.lock() = snapshot;
                Ok(())
            }
            None => Err(engine_error("cannot rollback - no transaction is active")),
        }
    }

    fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn table_exists(&mut self, table_name: &str) -> SpatiaResult<bool> {
        Ok(self.state.lock().has_table(table_name))
    }

    fn load_extension(&mut self, library: &str, _entry_point: Option<&str>) -> SpatiaResult<()> {
        self.state.lock().extensions.push(library.to_string());
        Ok(())
    }

    fn set_journal_mode(&mut self, journal_mode: JournalMode) -> SpatiaResult<()> {
        if journal_mode == JournalMode::Automatic {
            return Err(SpatiaError::new(
                "Journal mode must be resolved before it is applied",
                ErrorKind::InvalidOperation,
            ));
        }
        self.state.lock().journal_mode = Some(journal_mode);
        Ok(())
    }
}
