use super::callback::OpenHelperCallback;
use super::connection::ConnectionRef;
use crate::common::JournalMode;
use crate::errors::SpatiaResult;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything an engine needs to open one database.
#[derive(Clone)]
pub struct OpenHelperConfiguration {
    name: Option<String>,
    path: Option<PathBuf>,
    version: u32,
    journal_mode: JournalMode,
    callback: Arc<dyn OpenHelperCallback>,
}

impl OpenHelperConfiguration {
    pub fn new(
        name: Option<String>,
        path: Option<PathBuf>,
        version: u32,
        journal_mode: JournalMode,
        callback: Arc<dyn OpenHelperCallback>,
    ) -> Self {
        OpenHelperConfiguration {
            name,
            path,
            version,
            journal_mode,
            callback,
        }
    }

    /// Database name, `None` for an in-memory database.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// File the database lives in, `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn journal_mode(&self) -> JournalMode {
        self.journal_mode
    }

    pub fn callback(&self) -> &Arc<dyn OpenHelperCallback> {
        &self.callback
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    /// Returns a copy of this configuration using another callback.
    pub fn with_callback(&self, callback: Arc<dyn OpenHelperCallback>) -> Self {
        OpenHelperConfiguration {
            callback,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for OpenHelperConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenHelperConfiguration")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("version", &self.version)
            .field("journal_mode", &self.journal_mode)
            .finish()
    }
}

/// Contract every engine's open helper fulfils.
///
/// Creating a helper performs no I/O. The first call to
/// [`writable_connection`](OpenHelperProvider::writable_connection) opens the
/// database and runs [`drive_open`](super::drive_open); later calls return
/// the same connection. When the open fails nothing is cached, so the next
/// call tries again.
pub trait OpenHelperProvider: Send + Sync {
    fn database_name(&self) -> Option<String>;

    fn writable_connection(&self) -> SpatiaResult<ConnectionRef>;

    /// Whether a connection is currently open.
    fn is_open(&self) -> bool;

    fn close(&self) -> SpatiaResult<()>;
}

/// Shared handle to an engine's open helper.
#[derive(Clone)]
pub struct OpenHelper {
    inner: Arc<dyn OpenHelperProvider>,
}

impl OpenHelper {
    pub fn new<T: OpenHelperProvider + 'static>(inner: T) -> Self {
        OpenHelper { inner: Arc::new(inner) }
    }
}

impl Deref for OpenHelper {
    type Target = Arc<dyn OpenHelperProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
