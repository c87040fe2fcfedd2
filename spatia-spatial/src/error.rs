use spatia::errors::{ErrorKind, SpatiaError};
use thiserror::Error;

/// Name of the extension category spatial errors are reported under.
pub const SPATIAL_EXTENSION: &str = "spatial";

/// Errors raised by the spatial layer.
#[derive(Error, Debug)]
pub enum SpatialError {
    #[error("Failed to load spatial extension {library}")]
    ExtensionLoad {
        library: String,
        #[source]
        source: SpatiaError,
    },

    #[error("Failed to initialise spatial metadata")]
    MetadataInit(#[source] SpatiaError),

    #[error("Invalid spatial configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<SpatialError> for SpatiaError {
    fn from(err: SpatialError) -> Self {
        let kind = ErrorKind::Extension(SPATIAL_EXTENSION.to_string());
        let message = err.to_string();
        match err {
            SpatialError::ExtensionLoad { source, .. } | SpatialError::MetadataInit(source) => {
                SpatiaError::new_with_cause(&message, kind, source)
            }
            SpatialError::InvalidConfiguration(_) => SpatiaError::new(&message, kind),
        }
    }
}
