//! # spatia_spatial
//!
//! Spatial layer for spatia. [`SpatialModule`] registers a factory layer
//! that loads the SpatiaLite extension into every connection and initialises
//! the spatial metadata the first time, underneath whichever engine the
//! builder uses.
//!
//! [`database_builder`] and [`in_memory_database_builder`] are the core
//! entry points with the module already loaded.
//!
//! ```rust,ignore
//! use spatia::common::Context;
//! use spatia_sqlite::SqliteModule;
//!
//! let db = spatia_spatial::database_builder(Context::new("/data/app"), PlacesSchema, "places.db")?
//!     .load_module(SqliteModule::new())
//!     .build()?;
//! ```

mod error;
mod extension;
mod layer;
mod spatial_module;

pub use error::*;
pub use extension::*;
pub use layer::SpatialLayer;
pub use spatial_module::*;

use spatia::common::Context;
use spatia::database_builder::DatabaseBuilder;
use spatia::errors::SpatiaResult;
use spatia::schema::DatabaseSchema;

/// Creates a builder for a spatially enabled, file-backed database.
///
/// Same contract as [`spatia::database_builder`]: a blank `name` fails
/// before anything else is checked.
pub fn database_builder<S: DatabaseSchema + 'static>(
    context: Context,
    schema: S,
    name: &str,
) -> SpatiaResult<DatabaseBuilder<S>> {
    Ok(spatia::database_builder(context, schema, name)?.load_module(SpatialModule::new()))
}

/// Creates a builder for a spatially enabled in-memory database.
pub fn in_memory_database_builder<S: DatabaseSchema + 'static>(context: Context, schema: S) -> DatabaseBuilder<S> {
    spatia::in_memory_database_builder(context, schema).load_module(SpatialModule::new())
}
