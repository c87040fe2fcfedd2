//! In-memory engine.
//!
//! Used when no engine module is loaded. It understands just enough SQL to
//! track which tables exist, keeps the version header and records every
//! statement it was given, which makes it the engine of choice for tests.

mod connection;
mod factory;

pub use connection::*;
pub use factory::*;
