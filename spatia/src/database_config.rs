//! Frozen database configuration.

use crate::common::{Context, DatabaseCallback, Executor, JournalMode};
use crate::errors::SpatiaResult;
use crate::migration::{DestructiveFallbackPolicy, MigrationContainer, MigrationResolver, ResolvedPlan};
use crate::open_helper::OpenHelperFactory;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The immutable set of options a database was built with.
///
/// # Purpose
/// Produced exactly once by [`DatabaseBuilder::build`](crate::database_builder::DatabaseBuilder::build)
/// after every validation rule passed. It exposes no setters; clones share
/// the same underlying state and can be sent to any thread.
///
/// # Characteristics
/// - The journal mode is already resolved and never `Automatic`
/// - Both executors are always present (defaults assigned at build time)
/// - The open-helper factory is already wrapped by every module layer
#[derive(Clone)]
pub struct DatabaseConfiguration {
    inner: Arc<DatabaseConfigurationInner>,
}

impl DatabaseConfiguration {
    pub(crate) fn new(inner: DatabaseConfigurationInner) -> Self {
        DatabaseConfiguration { inner: Arc::new(inner) }
    }

    /// Resolves the plan that takes a database from `current_version` to the
    /// schema version.
    pub fn resolve_migration(&self, current_version: u32) -> SpatiaResult<ResolvedPlan> {
        MigrationResolver::new(&self.inner.migrations, &self.inner.fallback)
            .resolve(current_version, self.inner.schema_version)
    }
}

impl Deref for DatabaseConfiguration {
    type Target = DatabaseConfigurationInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for DatabaseConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfiguration")
            .field("name", &self.inner.name)
            .field("path", &self.inner.path)
            .field("schema_version", &self.inner.schema_version)
            .field("journal_mode", &self.inner.journal_mode)
            .field("callbacks", &self.inner.callbacks.len())
            .field("migrations", &self.inner.migrations.len())
            .field("fallback", &self.inner.fallback)
            .field("asset_path", &self.inner.asset_path)
            .field("in_memory", &self.inner.in_memory)
            .field("multi_instance_invalidation", &self.inner.multi_instance_invalidation)
            .field("allow_main_thread_queries", &self.inner.allow_main_thread_queries)
            .finish()
    }
}

pub struct DatabaseConfigurationInner {
    pub(crate) context: Context,
    pub(crate) name: Option<String>,
    pub(crate) path: Option<PathBuf>,
    pub(crate) schema_version: u32,
    pub(crate) journal_mode: JournalMode,
    pub(crate) query_executor: Arc<dyn Executor>,
    pub(crate) transaction_executor: Arc<dyn Executor>,
    pub(crate) callbacks: Vec<Arc<dyn DatabaseCallback>>,
    pub(crate) open_helper_factory: OpenHelperFactory,
    pub(crate) asset_path: Option<PathBuf>,
    pub(crate) in_memory: bool,
    pub(crate) multi_instance_invalidation: bool,
    pub(crate) allow_main_thread_queries: bool,
    pub(crate) migrations: MigrationContainer,
    pub(crate) fallback: DestructiveFallbackPolicy,
}

impl DatabaseConfigurationInner {
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Database name, `None` for an in-memory database.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// File the database lives in, `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn journal_mode(&self) -> JournalMode {
        self.journal_mode
    }

    pub fn query_executor(&self) -> &Arc<dyn Executor> {
        &self.query_executor
    }

    pub fn transaction_executor(&self) -> &Arc<dyn Executor> {
        &self.transaction_executor
    }

    /// Callbacks in registration order.
    pub fn callbacks(&self) -> &[Arc<dyn DatabaseCallback>] {
        &self.callbacks
    }

    pub fn open_helper_factory(&self) -> &OpenHelperFactory {
        &self.open_helper_factory
    }

    /// Resolved path of the asset the database is seeded from.
    pub fn asset_path(&self) -> Option<&Path> {
        self.asset_path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    pub fn is_multi_instance_invalidation(&self) -> bool {
        self.multi_instance_invalidation
    }

    pub fn allow_main_thread_queries(&self) -> bool {
        self.allow_main_thread_queries
    }

    pub fn migrations(&self) -> &MigrationContainer {
        &self.migrations
    }

    pub fn fallback_policy(&self) -> &DestructiveFallbackPolicy {
        &self.fallback
    }
}
