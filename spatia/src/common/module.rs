use crate::errors::SpatiaResult;
use crate::open_helper::{OpenHelperFactory, OpenHelperLayer};
use std::sync::Arc;

/// Contract for modules that extend a database builder.
///
/// # Purpose
/// A module bundles engine support or an extension layer. When loaded through
/// [`DatabaseBuilder::load_module`](crate::database_builder::DatabaseBuilder::load_module)
/// it registers what it provides with the [`ModuleRegistrar`]:
///
/// - an open-helper factory (a storage engine, such as the SQLite adapter),
///   which counts as the builder's factory override;
/// - factory layers, which wrap whatever factory the builder ends up with
///   (such as the spatial extension).
///
/// Layers are applied in load order, the first loaded being innermost.
pub trait SpatiaModule: Send + Sync {
    /// Short name used in logs and configuration errors.
    fn name(&self) -> &str;

    /// Registers the module's factory and layers.
    fn load(&self, registrar: &mut ModuleRegistrar) -> SpatiaResult<()>;
}

/// Collects what loaded modules contribute to a builder.
#[derive(Default)]
pub struct ModuleRegistrar {
    factories: Vec<(String, OpenHelperFactory)>,
    layers: Vec<(String, Arc<dyn OpenHelperLayer>)>,
    current_module: String,
}

impl ModuleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a storage engine factory on behalf of the module being loaded.
    pub fn register_open_helper_factory(&mut self, factory: OpenHelperFactory) -> SpatiaResult<()> {
        self.factories.push((self.current_module.clone(), factory));
        Ok(())
    }

    /// Registers a layer wrapping the final open-helper factory.
    pub fn register_factory_layer<L: OpenHelperLayer + 'static>(&mut self, layer: L) -> SpatiaResult<()> {
        self.layers.push((self.current_module.clone(), Arc::new(layer)));
        Ok(())
    }

    pub(crate) fn load(&mut self, module: &dyn SpatiaModule) -> SpatiaResult<()> {
        self.current_module = module.name().to_string();
        let result = module.load(self);
        self.current_module.clear();
        result
    }

    pub(crate) fn factories(&self) -> &[(String, OpenHelperFactory)] {
        &self.factories
    }

    pub(crate) fn layers(&self) -> &[(String, Arc<dyn OpenHelperLayer>)] {
        &self.layers
    }
}
