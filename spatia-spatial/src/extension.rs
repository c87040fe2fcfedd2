use crate::error::SpatialError;
use spatia::errors::SpatiaResult;
use spatia::open_helper::Connection;

/// Library loaded when no other one is configured.
pub const DEFAULT_SPATIAL_LIBRARY: &str = "mod_spatialite";

/// Table whose presence marks spatial metadata as initialised.
pub const SPATIAL_REF_SYS_TABLE: &str = "spatial_ref_sys";

/// Which reference systems the spatial metadata is seeded with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpatialMetadataMode {
    /// Every known spatial reference system.
    #[default]
    Full,
    /// Only WGS84 based reference systems, much smaller.
    Wgs84Only,
}

impl SpatialMetadataMode {
    /// Statement that initialises the metadata tables in a single transaction.
    pub fn init_statement(&self) -> &'static str {
        match self {
            SpatialMetadataMode::Full => "SELECT InitSpatialMetaData(1);",
            SpatialMetadataMode::Wgs84Only => "SELECT InitSpatialMetaData(1, 'WGS84_ONLY');",
        }
    }
}

/// The spatial extension library and how its metadata is set up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialExtension {
    library: String,
    entry_point: Option<String>,
    metadata_mode: SpatialMetadataMode,
}

impl SpatialExtension {
    pub fn new(library: &str, entry_point: Option<&str>, metadata_mode: SpatialMetadataMode) -> SpatiaResult<Self> {
        if library.trim().is_empty() {
            log::error!("Spatial extension library is blank");
            return Err(SpatialError::InvalidConfiguration("the extension library is blank".to_string()).into());
        }

        Ok(SpatialExtension {
            library: library.to_string(),
            entry_point: entry_point.map(str::to_string),
            metadata_mode,
        })
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn metadata_mode(&self) -> SpatialMetadataMode {
        self.metadata_mode
    }

    /// Loads the extension into `connection`.
    pub fn load(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        connection
            .load_extension(&self.library, self.entry_point.as_deref())
            .map_err(|source| {
                log::error!("Failed to load spatial extension {}: {}", self.library, source);
                SpatialError::ExtensionLoad {
                    library: self.library.clone(),
                    source,
                }
                .into()
            })
    }

    /// Initialises the spatial metadata unless `spatial_ref_sys` already
    /// exists. Returns whether the initialisation ran.
    pub fn initialize_metadata(&self, connection: &mut dyn Connection) -> SpatiaResult<bool> {
        let initialized = connection
            .table_exists(SPATIAL_REF_SYS_TABLE)
            .map_err(SpatialError::MetadataInit)?;
        if initialized {
            return Ok(false);
        }

        log::debug!("Initialising spatial metadata ({:?})", self.metadata_mode);
        connection
            .execute_batch(self.metadata_mode.init_statement())
            .map_err(|source| {
                log::error!("Failed to initialise spatial metadata: {}", source);
                SpatialError::MetadataInit(source)
            })?;
        Ok(true)
    }
}

impl Default for SpatialExtension {
    fn default() -> Self {
        SpatialExtension {
            library: DEFAULT_SPATIAL_LIBRARY.to_string(),
            entry_point: None,
            metadata_mode: SpatialMetadataMode::Full,
        }
    }
}
