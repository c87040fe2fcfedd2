//! Schema migration support.
//!
//! A [`Migration`] transforms a database from one schema version to another.
//! Migrations registered on the builder end up in a [`MigrationContainer`];
//! when a database is opened with a version header that differs from the
//! schema version, the [`MigrationResolver`] turns the container and the
//! [`DestructiveFallbackPolicy`] into a [`ResolvedPlan`].
//!
//! # Resolution
//!
//! - equal versions need no work;
//! - otherwise the resolver walks from the current version toward the target,
//!   taking at each step the migration that lands furthest toward the target
//!   without going past it;
//! - when no chain reaches the target, the fallback policy decides between a
//!   destructive recreate and a `NoMigrationPath` error.
//!
//! Each migration step runs in its own transaction and the version header is
//! advanced only after the step commits, so a failed open resumes from the
//! last version that was reached.

mod container;
mod migration;
mod policy;
mod resolver;

pub use container::MigrationContainer;
pub use migration::{Migration, MigrationFn};
pub use policy::DestructiveFallbackPolicy;
pub use resolver::{MigrationResolver, ResolvedPlan};
