use crate::extension::{SpatialExtension, SpatialMetadataMode, DEFAULT_SPATIAL_LIBRARY};
use crate::layer::SpatialLayer;
use spatia::common::{ModuleRegistrar, SpatiaModule};
use spatia::errors::SpatiaResult;

/// Spatia module that layers the spatial extension under every connection.
///
/// It registers a [`SpatialLayer`], so it combines with whichever engine the
/// builder ends up with rather than replacing it.
///
/// ## Example
///
/// ```rust,ignore
/// use spatia::common::Context;
/// use spatia_spatial::{SpatialMetadataMode, SpatialModule};
///
/// let db = spatia::database_builder(Context::new("/data/app"), PlacesSchema, "places.db")?
///     .load_module(
///         SpatialModule::with_config()
///             .metadata_mode(SpatialMetadataMode::Wgs84Only)
///             .build()?,
///     )
///     .build()?;
/// ```
pub struct SpatialModule {
    extension: SpatialExtension,
}

impl SpatialModule {
    pub fn new() -> SpatialModule {
        SpatialModule {
            extension: SpatialExtension::default(),
        }
    }

    #[inline]
    pub fn with_config() -> SpatialModuleBuilder {
        SpatialModuleBuilder::new()
    }

    pub fn extension(&self) -> &SpatialExtension {
        &self.extension
    }
}

impl Default for SpatialModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatiaModule for SpatialModule {
    fn name(&self) -> &str {
        "spatial"
    }

    fn load(&self, registrar: &mut ModuleRegistrar) -> SpatiaResult<()> {
        registrar.register_factory_layer(SpatialLayer::new(self.extension.clone()))
    }
}

/// Builder for configuring a spatial module.
pub struct SpatialModuleBuilder {
    library: String,
    entry_point: Option<String>,
    metadata_mode: SpatialMetadataMode,
}

impl SpatialModuleBuilder {
    pub fn new() -> SpatialModuleBuilder {
        SpatialModuleBuilder {
            library: DEFAULT_SPATIAL_LIBRARY.to_string(),
            entry_point: None,
            metadata_mode: SpatialMetadataMode::default(),
        }
    }

    /// Path or name of the extension library.
    pub fn library(mut self, library: &str) -> Self {
        self.library = library.to_string();
        self
    }

    /// Entry point of the extension library, when it isn't the default one.
    pub fn entry_point(mut self, entry_point: &str) -> Self {
        self.entry_point = Some(entry_point.to_string());
        self
    }

    pub fn metadata_mode(mut self, metadata_mode: SpatialMetadataMode) -> Self {
        self.metadata_mode = metadata_mode;
        self
    }

    /// Fails when the library is blank.
    pub fn build(self) -> SpatiaResult<SpatialModule> {
        let extension = SpatialExtension::new(&self.library, self.entry_point.as_deref(), self.metadata_mode)?;
        Ok(SpatialModule { extension })
    }
}

impl Default for SpatialModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
