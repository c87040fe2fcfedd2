use crate::common::{dispatch_callbacks, CallbackHook};
use crate::database_config::DatabaseConfiguration;
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::migration::{Migration, ResolvedPlan};
use crate::open_helper::{with_transaction, Connection, OpenHelperCallback};
use crate::schema::DatabaseSchema;
use std::sync::Arc;

/// Reconciles the persisted version header with the schema on open.
///
/// Fresh databases get their managed tables and header in one transaction.
/// Existing databases go through the migration resolver: each migration step
/// commits on its own and moves the header to its end version, a destructive
/// recreate runs as a single transaction.
pub(crate) struct SchemaOpenCallback<S: DatabaseSchema> {
    schema: Arc<S>,
    config: DatabaseConfiguration,
}

impl<S: DatabaseSchema> SchemaOpenCallback<S> {
    pub(crate) fn new(schema: Arc<S>, config: DatabaseConfiguration) -> Self {
        SchemaOpenCallback { schema, config }
    }

    fn reconcile(&self, connection: &mut dyn Connection, old_version: u32) -> SpatiaResult<()> {
        match self.config.resolve_migration(old_version)? {
            ResolvedPlan::NoOp => Ok(()),
            ResolvedPlan::Migrate(path) => self.migrate(connection, &path),
            ResolvedPlan::DestructiveRecreate => self.recreate(connection, old_version),
        }
    }

    fn migrate(&self, connection: &mut dyn Connection, path: &[Migration]) -> SpatiaResult<()> {
        for migration in path {
            let (start, end) = (migration.start_version(), migration.end_version());
            log::debug!("Applying migration from version {} to {}", start, end);

            with_transaction(connection, |conn| {
                migration.migrate(conn)?;
                conn.set_version(end)
            })
            .map_err(|err| {
                log::error!("Migration from version {} to {} failed: {}", start, end, err);
                SpatiaError::new_with_cause(
                    &format!("Migration from version {} to {} failed", start, end),
                    ErrorKind::MigrationStepFailure,
                    err,
                )
            })?;
        }

        self.schema.validate_schema(connection).map_err(|err| {
            log::error!("Schema validation failed after migration: {}", err);
            SpatiaError::new_with_cause(
                "Migration didn't properly handle the schema",
                ErrorKind::SchemaValidationFailed,
                err,
            )
        })
    }

    fn recreate(&self, connection: &mut dyn Connection, old_version: u32) -> SpatiaResult<()> {
        let target = self.schema.version();
        log::warn!(
            "Destructively recreating {} from version {} to {}, existing data is lost",
            self.config.name().unwrap_or("in-memory database"),
            old_version,
            target
        );

        with_transaction(connection, |conn| {
            self.schema.drop_all_tables(conn)?;
            dispatch_callbacks(self.config.callbacks(), CallbackHook::DestructiveMigration, conn)?;
            self.schema.create_all_tables(conn)?;
            conn.set_version(target)
        })
    }
}

impl<S: DatabaseSchema> OpenHelperCallback for SchemaOpenCallback<S> {
    fn on_create(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        let target = self.schema.version();
        with_transaction(connection, |conn| {
            self.schema.create_all_tables(conn)?;
            conn.set_version(target)
        })?;
        log::debug!("Created database schema at version {}", target);
        dispatch_callbacks(self.config.callbacks(), CallbackHook::Create, connection)
    }

    fn on_upgrade(&self, connection: &mut dyn Connection, old_version: u32, _new_version: u32) -> SpatiaResult<()> {
        self.reconcile(connection, old_version)
    }

    fn on_downgrade(&self, connection: &mut dyn Connection, old_version: u32, _new_version: u32) -> SpatiaResult<()> {
        self.reconcile(connection, old_version)
    }

    fn on_open(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
        dispatch_callbacks(self.config.callbacks(), CallbackHook::Open, connection)
    }
}
