//! Common types shared by the builder, the configuration and the open sequence.

mod callback;
mod constants;
mod context;
mod executor;
mod journal_mode;
mod module;
mod type_utils;

pub use callback::*;
pub use constants::*;
pub use context::*;
pub use executor::*;
pub use journal_mode::*;
pub use module::*;
pub use type_utils::*;
