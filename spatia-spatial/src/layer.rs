use crate::extension::SpatialExtension;
use spatia::errors::SpatiaResult;
use spatia::open_helper::{
    Connection, OpenHelper, OpenHelperCallback, OpenHelperConfiguration, OpenHelperFactory,
    OpenHelperFactoryProvider, OpenHelperLayer,
};
use std::sync::Arc;

/// Factory layer that makes every connection spatially enabled.
///
/// The wrapped factory creates its helpers with a callback that loads the
/// extension and initialises the spatial metadata in `on_configure`, before
/// the delegate callback creates or migrates the schema.
pub struct SpatialLayer {
    extension: SpatialExtension,
}

impl SpatialLayer {
    pub fn new(extension: SpatialExtension) -> Self {
        SpatialLayer { extension }
    }

    pub fn extension(&self) -> &SpatialExtension {
        &self.extension
    }
}

impl OpenHelperLayer for SpatialLayer {
    fn wrap(&self, factory: OpenHelperFactory) -> OpenHelperFactory {
        OpenHelperFactory::new(SpatialOpenHelperFactory {
            delegate: factory,
            extension: self.extension.clone(),
        })
    }
}

struct SpatialOpenHelperFactory {
    delegate: OpenHelperFactory,
    extension: SpatialExtension,
}

impl OpenHelperFactoryProvider for SpatialOpenHelperFactory {
    fn create(&self, config: OpenHelperConfiguration) -> SpatiaResult<OpenHelper> {
        let callback = SpatialOpenCallback {
            extension: self.extension.clone(),
            delegate: config.callback().clone(),
        };
        self.delegate.create(config.with_callback(Arc::new(callback)))
    }
}

struct SpatialOpenCallback {
    extension: SpatialExtension,
    delegate: Arc<dyn OpenHelperCallback>,
}

impl OpenHelperCallback for SpatialOpenCallback {
    fn on_configure(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.extension.load(connection)?;
        self.extension.initialize_metadata(connection)?;
        self.delegate.on_configure(connection)
    }

    fn on_create(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.delegate.on_create(connection)
    }

    fn on_upgrade(&self, connection: &mut dyn Connection, old_version: u32, new_version: u32) -> SpatiaResult<()> {
        self.delegate.on_upgrade(connection, old_version, new_version)
    }

    fn on_downgrade(&self, connection: &mut dyn Connection, old_version: u32, new_version: u32) -> SpatiaResult<()> {
        self.delegate.on_downgrade(connection, old_version, new_version)
    }

    fn on_open(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        self.delegate.on_open(connection)
    }
}
