//! # Spatia - Versioned Embedded Database Builder
//!
//! Spatia configures and opens a versioned embedded relational database. A
//! fluent builder accumulates options, freezes them into an immutable
//! configuration and hands back a [`Database`](database::Database). The first
//! connection request reads the persisted schema version header, works out
//! how to reach the version the application expects and runs it.
//!
//! ## Key Features
//!
//! - **Migrations**: directed version-to-version transforms, with the widest
//!   jump toward the target preferred at every step
//! - **Destructive fallback**: unconditional, on downgrade only, or from an
//!   explicit set of start versions
//! - **Lifecycle callbacks**: `on_create`, `on_open` and
//!   `on_destructive_migration`, run in registration order
//! - **Executors**: query and transaction executors with a shared bounded
//!   default pool; transactions are serialized
//! - **Pluggable engines**: an in-memory engine ships with the core crate,
//!   SQLite lives in `spatia-sqlite`, and the spatial layer in `spatia-spatial`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spatia::common::Context;
//! use spatia::migration::Migration;
//!
//! let db = spatia::database_builder(Context::new("/data/app"), PlacesSchema, "places.db")?
//!     .add_migration(Migration::new(1, 2, |conn| {
//!         conn.execute_batch("ALTER TABLE place ADD COLUMN rating INTEGER;")
//!     }))
//!     .fallback_to_destructive_migration_on_downgrade()
//!     .build()?;
//!
//! db.run_in_transaction(|conn| conn.execute_batch("DELETE FROM place;"))?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Context, callbacks, executors, journal mode and modules
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Migrations, fallback policy and the migration resolver
//! - [`open_helper`] - Engine abstraction and the in-memory engine
//! - [`schema`] - The database definition implemented by applications
//! - [`database_builder`] - Builder and its validation rules
//! - [`database_config`] - Frozen configuration
//! - [`database`] - The opened database handle

use std::thread::available_parallelism;

pub mod common;
pub mod database;
pub mod database_builder;
pub mod database_config;
pub mod errors;
pub mod migration;
pub mod open_helper;
pub mod schema;
mod schema_callback;

use crate::common::Context;
use crate::database_builder::DatabaseBuilder;
use crate::errors::SpatiaResult;
use crate::schema::DatabaseSchema;

/// Creates a builder for a file-backed database.
///
/// Fails immediately with a configuration error when `name` is blank; in
/// that case no other validation runs.
///
/// # Examples
///
/// ```rust
/// use spatia::common::Context;
/// use spatia::errors::ErrorKind;
/// use spatia::schema::DatabaseSchema;
/// # use spatia::errors::SpatiaResult;
/// # use spatia::open_helper::Connection;
/// # struct Schema;
/// # impl DatabaseSchema for Schema {
/// #     fn version(&self) -> u32 { 1 }
/// #     fn create_all_tables(&self, _c: &mut dyn Connection) -> SpatiaResult<()> { Ok(()) }
/// #     fn drop_all_tables(&self, _c: &mut dyn Connection) -> SpatiaResult<()> { Ok(()) }
/// # }
///
/// let result = spatia::database_builder(Context::new("/tmp"), Schema, "  ");
/// assert_eq!(result.err().unwrap().kind(), &ErrorKind::ConfigurationError);
/// ```
pub fn database_builder<S: DatabaseSchema + 'static>(
    context: Context,
    schema: S,
    name: &str,
) -> SpatiaResult<DatabaseBuilder<S>> {
    DatabaseBuilder::new(context, schema, name)
}

/// Creates a builder for an in-memory database.
///
/// The database lives as long as the handle does and is gone once it is
/// closed.
pub fn in_memory_database_builder<S: DatabaseSchema + 'static>(
    context: Context,
    schema: S,
) -> DatabaseBuilder<S> {
    DatabaseBuilder::in_memory(context, schema)
}

/// Returns the number of available CPU cores.
///
/// This function attempts to detect the number of available processors on the system.
/// If detection fails, it defaults to 1.
///
/// # Examples
///
/// ```rust
/// use spatia::get_cpu_count;
///
/// let cpu_count = get_cpu_count();
/// assert!(cpu_count > 0);
/// ```
pub fn get_cpu_count() -> usize {
    available_parallelism()
        .map(|p| p.get())
        .unwrap_or_else(|err| {
            log::warn!("Failed to detect available parallelism: {}. Defaulting to single thread.", err);
            1
        })
}
