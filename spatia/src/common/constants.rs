// version header constants
/// Version header value of a database that has never been created.
pub const NO_VERSION: u32 = 0;
/// Lowest schema version a database definition may declare.
pub const MIN_SCHEMA_VERSION: u32 = 1;

// executor constants
pub const DEFAULT_POOL_NAME: &str = "spatia-io";
pub const MIN_DEFAULT_POOL_SIZE: usize = 2;
pub const MAX_DEFAULT_POOL_SIZE: usize = 4;

// in-memory constants
pub const IN_MEMORY_NAME_PREFIX: &str = "memory:";

pub const SPATIA_VERSION: &str = env!("CARGO_PKG_VERSION");
