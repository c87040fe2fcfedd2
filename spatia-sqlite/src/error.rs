use spatia::common::JournalMode;
use spatia::errors::{ErrorKind, SpatiaError};
use std::error::Error;
use thiserror::Error;

/// Errors raised by the SQLite engine itself.
#[derive(Error, Debug)]
pub enum SqliteError {
    /// rusqlite reported a failure
    #[error("{0}")]
    Engine(#[from] rusqlite::Error),
    /// The `user_version` pragma holds a value that is not a schema version
    #[error("Version header {0} is out of range")]
    InvalidVersion(i64),
    /// `Automatic` reached the connection without being resolved
    #[error("Journal mode {0} must be resolved before it is applied")]
    UnresolvedJournalMode(JournalMode),
    /// A transaction was started while another one was still open
    #[error("A transaction is already in progress")]
    NestedTransaction,
}

impl From<SqliteError> for SpatiaError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Engine(err) => to_spatia_error(err),
            SqliteError::UnresolvedJournalMode(_) | SqliteError::NestedTransaction => {
                SpatiaError::new(&err.to_string(), ErrorKind::InvalidOperation)
            }
            SqliteError::InvalidVersion(_) => SpatiaError::new(&err.to_string(), ErrorKind::EngineError),
        }
    }
}

/// Maps an engine error onto a [`SpatiaError`].
///
/// - "permission" / "readonly" → PermissionDenied
/// - "unable to open" → IOError
/// - Other → EngineError
pub(crate) fn to_spatia_error(error: impl Error) -> SpatiaError {
    let error_msg = error.to_string();
    let lowered = error_msg.to_lowercase();
    let error_kind = if lowered.contains("permission") || lowered.contains("readonly") {
        ErrorKind::PermissionDenied
    } else if lowered.contains("unable to open") {
        ErrorKind::IOError
    } else {
        ErrorKind::EngineError
    };
    SpatiaError::new(&format!("SQLite Error: {}", error_msg), error_kind)
}
