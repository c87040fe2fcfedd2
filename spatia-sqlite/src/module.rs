use crate::config::SqliteConfig;
use crate::factory::SqliteOpenHelperFactory;
use spatia::common::{ModuleRegistrar, SpatiaModule};
use spatia::errors::SpatiaResult;
use spatia::open_helper::OpenHelperFactory;
use std::time::Duration;

/// Spatia module that opens databases with SQLite.
///
/// Loading it registers a [`SqliteOpenHelperFactory`] as the builder's
/// open-helper factory, so it counts toward the single factory override a
/// builder accepts.
///
/// # Examples
///
/// ```rust,ignore
/// use spatia::common::Context;
/// use spatia_sqlite::SqliteModule;
/// use std::time::Duration;
///
/// let db = spatia::database_builder(Context::new("/data/app"), PlacesSchema, "places.db")?
///     .load_module(
///         SqliteModule::with_config()
///             .busy_timeout(Duration::from_secs(10))
///             .build(),
///     )
///     .build()?;
/// ```
pub struct SqliteModule {
    config: SqliteConfig,
}

impl SqliteModule {
    /// Module with the default connection settings.
    pub fn new() -> SqliteModule {
        SqliteModule {
            config: SqliteConfig::new(),
        }
    }

    /// Creates a builder for configuring a SQLite module.
    #[inline]
    pub fn with_config() -> SqliteModuleBuilder {
        SqliteModuleBuilder::new()
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }
}

impl Default for SqliteModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatiaModule for SqliteModule {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self, registrar: &mut ModuleRegistrar) -> SpatiaResult<()> {
        let factory = SqliteOpenHelperFactory::new(self.config.clone());
        registrar.register_open_helper_factory(OpenHelperFactory::new(factory))
    }
}

/// Builder for configuring a SQLite module.
pub struct SqliteModuleBuilder {
    config: SqliteConfig,
}

impl SqliteModuleBuilder {
    #[inline]
    pub fn new() -> SqliteModuleBuilder {
        SqliteModuleBuilder {
            config: SqliteConfig::new(),
        }
    }

    /// How long a connection waits on a locked database before failing.
    #[inline]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.config.set_busy_timeout(busy_timeout);
        self
    }

    /// Whether `PRAGMA foreign_keys = ON` is applied to every connection.
    #[inline]
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.config.set_foreign_keys(enabled);
        self
    }

    pub fn build(self) -> SqliteModule {
        SqliteModule { config: self.config }
    }
}

impl Default for SqliteModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
