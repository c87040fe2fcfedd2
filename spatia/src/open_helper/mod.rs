//! Engine abstraction.
//!
//! An [`OpenHelperFactory`] turns an [`OpenHelperConfiguration`] into an
//! [`OpenHelper`], which hands out the writable [`Connection`]. Opening the
//! first connection runs [`drive_open`] against the configuration's
//! [`OpenHelperCallback`]; every engine shares that driver so the open
//! sequence is the same regardless of the storage underneath.
//!
//! [`OpenHelperLayer`]s decorate a factory. Modules use them to add behavior
//! below the connection, such as loading an extension on every connection.

mod asset;
mod callback;
mod connection;
mod factory;
mod helper;
pub mod memory;

pub(crate) use asset::AssetSeedingLayer;
pub use callback::*;
pub use connection::*;
pub use factory::*;
pub use helper::*;
