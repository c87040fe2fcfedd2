//! # spatia_sqlite
//!
//! SQLite engine for spatia, built on rusqlite. Load [`SqliteModule`] into a
//! database builder to open file databases (and private in-memory ones)
//! with SQLite. The schema version header maps to the `user_version` pragma.

mod config;
mod connection;
mod error;
mod factory;
mod module;

pub use config::*;
pub use connection::*;
pub use error::SqliteError;
pub use factory::*;
pub use module::*;
