//! Builder for [`Database`] handles.

use crate::common::{
    default_executor, Context, DatabaseCallback, Executor, JournalMode, ModuleRegistrar,
    SpatiaModule, MIN_SCHEMA_VERSION, NO_VERSION,
};
use crate::database::Database;
use crate::database_config::{DatabaseConfiguration, DatabaseConfigurationInner};
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::migration::{DestructiveFallbackPolicy, Migration, MigrationContainer};
use crate::open_helper::memory::InMemoryOpenHelperFactory;
use crate::open_helper::{AssetSeedingLayer, OpenHelperFactory, OpenHelperLayer};
use crate::schema::DatabaseSchema;
use itertools::Itertools;
use std::sync::Arc;

/// Fluent accumulator of database options.
///
/// # Purpose
/// Every setter consumes the builder and returns it, so the in-progress
/// configuration has exactly one owner. Setters check only their own
/// argument and never touch the file system. The first such failure is kept
/// and returned by [`build`](DatabaseBuilder::build); setters called after
/// it have no effect.
///
/// [`build`](DatabaseBuilder::build) then checks the rules that involve
/// several options, in this order, and stops at the first violation:
///
/// 1. the schema version is at least 1;
/// 2. no two migrations share a `(start, end)` pair;
/// 3. no version passed to
///    [`fallback_to_destructive_migration_from`](DatabaseBuilder::fallback_to_destructive_migration_from)
///    is the start or end of a migration;
/// 4. at most one open-helper factory was supplied, counting both
///    [`open_helper_factory`](DatabaseBuilder::open_helper_factory) calls and
///    factories registered by modules;
/// 5. an in-memory database is not seeded from an asset.
///
/// # Examples
///
/// ```rust,ignore
/// let db = spatia::database_builder(context, PlacesSchema, "places.db")?
///     .add_migrations(vec![
///         Migration::new(1, 2, add_rating_column),
///         Migration::new(2, 3, add_tag_table),
///     ])
///     .fallback_to_destructive_migration_on_downgrade()
///     .add_callback(SeedCallback)
///     .build()?;
/// ```
pub struct DatabaseBuilder<S: DatabaseSchema> {
    error: Option<SpatiaError>,
    context: Context,
    schema: S,
    name: Option<String>,
    factory_overrides: Vec<OpenHelperFactory>,
    registrar: ModuleRegistrar,
    migrations: MigrationContainer,
    fallback: DestructiveFallbackPolicy,
    journal_mode: JournalMode,
    query_executor: Option<Arc<dyn Executor>>,
    transaction_executor: Option<Arc<dyn Executor>>,
    callbacks: Vec<Arc<dyn DatabaseCallback>>,
    asset_path: Option<String>,
    multi_instance_invalidation: bool,
    allow_main_thread_queries: bool,
}

impl<S: DatabaseSchema + 'static> DatabaseBuilder<S> {
    /// Creates a builder for a file-backed database named `name`.
    pub fn new(context: Context, schema: S, name: &str) -> SpatiaResult<Self> {
        if name.trim().is_empty() {
            log::error!("Cannot build a database with an empty name");
            return Err(SpatiaError::new(
                "Cannot build a database with an empty name. If you are trying to create an \
                 in-memory database, use in_memory_database_builder",
                ErrorKind::ConfigurationError,
            ));
        }
        Ok(Self::create(context, schema, Some(name.to_string())))
    }

    /// Creates a builder for an in-memory database.
    pub fn in_memory(context: Context, schema: S) -> Self {
        Self::create(context, schema, None)
    }

    fn create(context: Context, schema: S, name: Option<String>) -> Self {
        DatabaseBuilder {
            error: None,
            context,
            schema,
            name,
            factory_overrides: Vec::new(),
            registrar: ModuleRegistrar::new(),
            migrations: MigrationContainer::new(),
            fallback: DestructiveFallbackPolicy::new(),
            journal_mode: JournalMode::Automatic,
            query_executor: None,
            transaction_executor: None,
            callbacks: Vec::new(),
            asset_path: None,
            multi_instance_invalidation: false,
            allow_main_thread_queries: false,
        }
    }

    fn capture(&mut self, message: &str) {
        if self.error.is_none() {
            log::error!("{}", message);
            self.error = Some(SpatiaError::new(message, ErrorKind::ConfigurationError));
        }
    }

    /// Sets the factory that creates the engine's open helper.
    ///
    /// Without it, an engine module's factory is used, and without one of
    /// those the in-memory engine.
    pub fn open_helper_factory(mut self, factory: OpenHelperFactory) -> Self {
        if self.error.is_none() {
            self.factory_overrides.push(factory);
        }
        self
    }

    /// Adds a migration. Registration order does not matter.
    pub fn add_migration(mut self, migration: Migration) -> Self {
        if self.error.is_some() {
            return self;
        }

        let (start, end) = (migration.start_version(), migration.end_version());
        if start == NO_VERSION || end == NO_VERSION {
            self.capture(&format!(
                "Migration from {} to {} uses version {}, schema versions start at {}",
                start, end, NO_VERSION, MIN_SCHEMA_VERSION
            ));
        } else if start == end {
            self.capture(&format!(
                "Migration from {} to {} does not change the version",
                start, end
            ));
        } else {
            self.migrations.add_migration(migration);
        }
        self
    }

    pub fn add_migrations(self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        migrations
            .into_iter()
            .fold(self, |builder, migration| builder.add_migration(migration))
    }

    /// Allows database access on the main thread.
    ///
    /// Without it, requesting a connection or running a transaction on the
    /// thread the context's main-thread detector reports fails.
    pub fn allow_main_thread_queries(mut self) -> Self {
        self.allow_main_thread_queries = true;
        self
    }

    /// Sets the journal mode. Defaults to [`JournalMode::Automatic`].
    pub fn journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.journal_mode = journal_mode;
        self
    }

    /// Sets the executor used for queries.
    ///
    /// When no transaction executor is set, transactions use this one too.
    pub fn query_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.query_executor = Some(executor);
        self
    }

    /// Sets the executor used for transactions.
    ///
    /// Transactions never run concurrently, whatever the executor's size.
    /// When no query executor is set, queries use this one too.
    pub fn transaction_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.transaction_executor = Some(executor);
        self
    }

    /// Requests cross-process invalidation of managed tables.
    ///
    /// Ignored, with a warning, for in-memory databases.
    pub fn enable_multi_instance_invalidation(mut self) -> Self {
        self.multi_instance_invalidation = true;
        self
    }

    /// Recreates the database when no migration path reaches the schema
    /// version, whatever the direction. All data is lost.
    pub fn fallback_to_destructive_migration(mut self) -> Self {
        self.fallback.set_unconditional();
        self
    }

    /// Recreates the database when a downgrade has no migration path.
    pub fn fallback_to_destructive_migration_on_downgrade(mut self) -> Self {
        self.fallback.set_on_downgrade_only();
        self
    }

    /// Recreates the database when no migration path exists from one of
    /// `start_versions`.
    ///
    /// None of these versions may be the start or end of a migration.
    pub fn fallback_to_destructive_migration_from(mut self, start_versions: impl IntoIterator<Item = u32>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let versions = start_versions.into_iter().collect::<Vec<_>>();
        if versions.contains(&NO_VERSION) {
            self.capture(&format!(
                "Destructive migration start versions must be at least {}",
                MIN_SCHEMA_VERSION
            ));
        } else {
            self.fallback.add_start_versions(versions);
        }
        self
    }

    /// Adds a lifecycle callback. Callbacks run in the order they were added.
    pub fn add_callback<C: DatabaseCallback + 'static>(mut self, callback: C) -> Self {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// Seeds the database from a file in the context's assets directory when
    /// it is opened for the first time and does not exist yet.
    ///
    /// **Experimental.** The asset is copied as is; its version header goes
    /// through the regular migration process afterwards.
    pub fn create_from_asset(mut self, asset_path: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        if asset_path.trim().is_empty() {
            self.capture("Asset path of a pre-packaged database cannot be empty");
        } else {
            self.asset_path = Some(asset_path.to_string());
        }
        self
    }

    /// Loads a module, which may register an engine factory and factory
    /// layers.
    pub fn load_module<M: SpatiaModule + 'static>(mut self, module: M) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.registrar.load(&module) {
                log::error!("Failed to load module {}: {}", module.name(), e);
                self.error = Some(e);
            }
        }
        self
    }

    /// Validates the accumulated options, freezes them and creates the
    /// database handle. The database itself is opened on the first
    /// connection request.
    pub fn build(mut self) -> SpatiaResult<Database<S>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.validate()?;

        let in_memory = self.name.is_none();
        let (query_executor, transaction_executor) =
            match (self.query_executor, self.transaction_executor) {
                (None, None) => {
                    let executor = default_executor();
                    (executor.clone(), executor)
                }
                (Some(query), None) => (query.clone(), query),
                (None, Some(transaction)) => (transaction.clone(), transaction),
                (Some(query), Some(transaction)) => (query, transaction),
            };

        let multi_instance_invalidation = if in_memory && self.multi_instance_invalidation {
            log::warn!("Multi-instance invalidation is not supported for in-memory databases, ignoring it");
            false
        } else {
            self.multi_instance_invalidation
        };

        let mut factory = self
            .factory_overrides
            .into_iter()
            .chain(self.registrar.factories().iter().map(|(_, f)| f.clone()))
            .next()
            .unwrap_or_else(|| OpenHelperFactory::new(InMemoryOpenHelperFactory::new()));

        for (module, layer) in self.registrar.layers() {
            log::debug!("Applying factory layer of module {}", module);
            factory = layer.wrap(factory);
        }

        let asset_path = self
            .asset_path
            .as_deref()
            .map(|path| self.context.asset_path(path));
        if let Some(path) = &asset_path {
            factory = AssetSeedingLayer::new(path.clone()).wrap(factory);
        }

        let path = self.name.as_deref().map(|name| self.context.database_path(name));
        let config = DatabaseConfiguration::new(DatabaseConfigurationInner {
            context: self.context,
            name: self.name,
            path,
            schema_version: self.schema.version(),
            journal_mode: self.journal_mode.resolve(in_memory),
            query_executor,
            transaction_executor,
            callbacks: self.callbacks,
            open_helper_factory: factory,
            asset_path,
            in_memory,
            multi_instance_invalidation,
            allow_main_thread_queries: self.allow_main_thread_queries,
            migrations: self.migrations,
            fallback: self.fallback,
        });

        log::debug!("Built database configuration {:?}", config);
        Database::new(Arc::new(self.schema), config)
    }

    fn validate(&self) -> SpatiaResult<()> {
        let version = self.schema.version();
        if version < MIN_SCHEMA_VERSION {
            return config_error(&format!(
                "Schema version {} is invalid, versions start at {}",
                version, MIN_SCHEMA_VERSION
            ));
        }

        let duplicates = self.migrations.duplicates();
        if !duplicates.is_empty() {
            return config_error(&format!(
                "More than one migration registered for {}",
                duplicates
                    .iter()
                    .map(|(start, end)| format!("{} -> {}", start, end))
                    .join(", ")
            ));
        }

        let endpoints = self.migrations.endpoint_versions();
        if let Some(version) = self
            .fallback
            .explicit_start_versions()
            .iter()
            .find(|v| endpoints.contains(v))
        {
            return config_error(&format!(
                "Inconsistency detected. A migration was supplied to add_migration that has a start \
                 or end version equal to a start version supplied to \
                 fallback_to_destructive_migration_from. Start version: {}",
                version
            ));
        }

        let factory_count = self.factory_overrides.len() + self.registrar.factories().len();
        if factory_count > 1 {
            let modules = self
                .registrar
                .factories()
                .iter()
                .map(|(module, _)| module.as_str())
                .join(", ");
            return config_error(&format!(
                "At most one open-helper factory may be supplied, found {} (explicit: {}, modules: [{}])",
                factory_count,
                self.factory_overrides.len(),
                modules
            ));
        }

        if self.name.is_none() && self.asset_path.is_some() {
            return config_error(
                "Cannot create an in-memory database from an asset, pre-packaged databases need a name",
            );
        }

        Ok(())
    }
}

fn config_error<T>(message: &str) -> SpatiaResult<T> {
    log::error!("{}", message);
    Err(SpatiaError::new(message, ErrorKind::ConfigurationError))
}
