use std::time::Duration;

/// Default time a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings applied by the SQLite engine to every connection it
/// opens, before the open sequence runs.
///
/// Defaults:
/// - busy timeout: 5 seconds
/// - foreign key enforcement: on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqliteConfig {
    busy_timeout: Duration,
    foreign_keys: bool,
}

impl SqliteConfig {
    #[inline]
    pub fn new() -> SqliteConfig {
        SqliteConfig {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            foreign_keys: true,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    pub fn foreign_keys(&self) -> bool {
        self.foreign_keys
    }

    pub(crate) fn set_busy_timeout(&mut self, busy_timeout: Duration) {
        self.busy_timeout = busy_timeout;
    }

    pub(crate) fn set_foreign_keys(&mut self, enabled: bool) {
        self.foreign_keys = enabled;
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new()
    }
}
