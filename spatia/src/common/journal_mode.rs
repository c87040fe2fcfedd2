use std::fmt::{Display, Formatter};

/// Journal mode of the database's write log.
///
/// The journal mode should be consistent across every handle opened on the
/// same database file. `Automatic` is only a request: it is resolved to a
/// concrete mode when the builder freezes its configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JournalMode {
    /// Let the builder pick the mode (write-ahead logging for files).
    #[default]
    Automatic,
    /// Rollback journal truncated at commit.
    Truncate,
    /// Write-ahead logging.
    WriteAheadLogging,
}

impl JournalMode {
    /// Resolves the requested mode for a database.
    ///
    /// In-memory databases have no write log to speak of, so anything other
    /// than `Truncate` collapses to `Truncate` for them.
    pub fn resolve(self, in_memory: bool) -> JournalMode {
        if in_memory {
            if self == JournalMode::WriteAheadLogging {
                log::warn!("Write-ahead logging is not supported for in-memory databases, using truncate");
            }
            return JournalMode::Truncate;
        }

        match self {
            JournalMode::Automatic => JournalMode::WriteAheadLogging,
            mode => mode,
        }
    }

    /// Value understood by the SQLite `journal_mode` pragma.
    ///
    /// `Automatic` has no pragma value and must be resolved first.
    pub fn pragma_value(&self) -> Option<&'static str> {
        match self {
            JournalMode::Automatic => None,
            JournalMode::Truncate => Some("TRUNCATE"),
            JournalMode::WriteAheadLogging => Some("WAL"),
        }
    }

    pub fn is_write_ahead_logging(&self) -> bool {
        *self == JournalMode::WriteAheadLogging
    }
}

impl Display for JournalMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalMode::Automatic => write!(f, "automatic"),
            JournalMode::Truncate => write!(f, "truncate"),
            JournalMode::WriteAheadLogging => write!(f, "write-ahead logging"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_automatic() {
        assert_eq!(JournalMode::default(), JournalMode::Automatic);
    }

    #[test]
    fn test_automatic_resolves_to_wal_for_files() {
        assert_eq!(JournalMode::Automatic.resolve(false), JournalMode::WriteAheadLogging);
    }

    #[test]
    fn test_explicit_mode_kept_for_files() {
        assert_eq!(JournalMode::Truncate.resolve(false), JournalMode::Truncate);
        assert_eq!(
            JournalMode::WriteAheadLogging.resolve(false),
            JournalMode::WriteAheadLogging
        );
    }

    #[test]
    fn test_in_memory_always_truncate() {
        assert_eq!(JournalMode::Automatic.resolve(true), JournalMode::Truncate);
        assert_eq!(JournalMode::WriteAheadLogging.resolve(true), JournalMode::Truncate);
        assert_eq!(JournalMode::Truncate.resolve(true), JournalMode::Truncate);
    }

    #[test]
    fn test_pragma_values() {
        assert_eq!(JournalMode::Automatic.pragma_value(), None);
        assert_eq!(JournalMode::Truncate.pragma_value(), Some("TRUNCATE"));
        assert_eq!(JournalMode::WriteAheadLogging.pragma_value(), Some("WAL"));
    }
}
