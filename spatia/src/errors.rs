use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for spatia operations.
///
/// Each kind names a category of failure so callers can react to, say, a
/// missing migration path differently from a broken builder configuration.
///
/// # Examples
///
/// ```rust
/// use spatia::errors::{ErrorKind, SpatiaError, SpatiaResult};
///
/// fn example() -> SpatiaResult<()> {
///     Err(SpatiaError::new("Database name is blank", ErrorKind::ConfigurationError))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Builder errors, raised while freezing the configuration
    /// The builder state violates a configuration rule
    ConfigurationError,

    // Open-time errors
    /// No chain of migrations reaches the target version and no fallback applies
    NoMigrationPath,
    /// A migration transform failed; the version header was left untouched
    MigrationStepFailure,
    /// The managed schema did not validate after migrations ran
    SchemaValidationFailed,
    /// A lifecycle callback asked for the open to be aborted
    FatalCallback,

    // Operation errors
    /// The operation is not valid in the current context
    InvalidOperation,
    /// The database handle has been closed
    DatabaseClosed,

    // IO and engine errors
    /// Generic IO error
    IOError,
    /// The file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,
    /// Error reported by the underlying database engine
    EngineError,

    // Executor errors
    /// A task could not be handed to an executor
    ExecutorError,

    // Extension errors - allows layered crates to plug in their own categories
    // The String contains the extension name (e.g., "spatial")
    /// Error from an extension module
    Extension(String),

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::NoMigrationPath => write!(f, "No migration path"),
            ErrorKind::MigrationStepFailure => write!(f, "Migration step failure"),
            ErrorKind::SchemaValidationFailed => write!(f, "Schema validation failed"),
            ErrorKind::FatalCallback => write!(f, "Fatal callback"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::DatabaseClosed => write!(f, "Database closed"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::EngineError => write!(f, "Engine error"),
            ErrorKind::ExecutorError => write!(f, "Executor error"),
            ErrorKind::Extension(name) => write!(f, "{} error", name),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom spatia error type.
///
/// `SpatiaError` carries a message, a kind, an optional cause and a backtrace
/// captured at construction time. Causes are exposed through
/// [`std::error::Error::source`] so the whole chain can be walked.
///
/// # Examples
///
/// ```rust
/// use spatia::errors::{ErrorKind, SpatiaError};
///
/// let cause = SpatiaError::new("disk I/O error", ErrorKind::EngineError);
/// let err = SpatiaError::new_with_cause("Migration from 1 to 2 failed", ErrorKind::MigrationStepFailure, cause);
/// assert_eq!(err.kind(), &ErrorKind::MigrationStepFailure);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct SpatiaError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<SpatiaError>>,
    backtrace: Atomic<Backtrace>,
}

impl SpatiaError {
    /// Creates a new `SpatiaError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        SpatiaError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `SpatiaError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: SpatiaError) -> Self {
        SpatiaError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&SpatiaError> {
        self.cause.as_deref()
    }

    /// Returns `true` when this error must abort a callback sequence.
    pub fn is_fatal(&self) -> bool {
        self.error_kind == ErrorKind::FatalCallback
    }
}

impl Display for SpatiaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for SpatiaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for SpatiaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for spatia operations.
pub type SpatiaResult<T> = Result<T, SpatiaError>;

impl From<std::io::Error> for SpatiaError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        SpatiaError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<String> for SpatiaError {
    fn from(msg: String) -> Self {
        SpatiaError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for SpatiaError {
    fn from(msg: &str) -> Self {
        SpatiaError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatia_error_new_creates_error() {
        let error = SpatiaError::new("An error occurred", ErrorKind::ConfigurationError);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::ConfigurationError);
        assert!(error.cause.is_none());
    }

    #[test]
    fn spatia_error_new_with_cause_creates_chain() {
        let cause = SpatiaError::new("disk I/O error", ErrorKind::EngineError);
        let error = SpatiaError::new_with_cause(
            "Migration from 1 to 2 failed",
            ErrorKind::MigrationStepFailure,
            cause,
        );
        assert_eq!(error.kind(), &ErrorKind::MigrationStepFailure);
        assert_eq!(error.cause().unwrap().kind(), &ErrorKind::EngineError);
        assert_eq!(error.source().unwrap().to_string(), "disk I/O error");
    }

    #[test]
    fn display_prints_only_message() {
        let error = SpatiaError::new("No migration path", ErrorKind::NoMigrationPath);
        assert_eq!(format!("{}", error), "No migration path");
    }

    #[test]
    fn debug_prints_cause_chain() {
        let cause = SpatiaError::new("inner", ErrorKind::IOError);
        let error = SpatiaError::new_with_cause("outer", ErrorKind::InternalError, cause);
        let debug = format!("{:?}", error);
        assert!(debug.starts_with("outer"));
        assert!(debug.contains("Caused by: inner"));
    }

    #[test]
    fn fatal_only_for_fatal_callback_kind() {
        assert!(SpatiaError::new("stop", ErrorKind::FatalCallback).is_fatal());
        assert!(!SpatiaError::new("keep going", ErrorKind::InternalError).is_fatal());
    }

    #[test]
    fn extension_kind_display_uses_name() {
        assert_eq!(ErrorKind::Extension("spatial".to_string()).to_string(), "spatial error");
    }

    #[test]
    fn from_io_error_maps_kind() {
        let not_found: SpatiaError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(not_found.kind(), &ErrorKind::FileNotFound);

        let denied: SpatiaError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(denied.kind(), &ErrorKind::PermissionDenied);

        let other: SpatiaError = std::io::Error::other("boom").into();
        assert_eq!(other.kind(), &ErrorKind::IOError);
        assert!(other.message().contains("boom"));
    }

    #[test]
    fn from_str_is_internal() {
        let error: SpatiaError = "oops".into();
        assert_eq!(error.kind(), &ErrorKind::InternalError);
        let error: SpatiaError = String::from("oops").into();
        assert_eq!(error.message(), "oops");
    }
}
