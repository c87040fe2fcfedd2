use crate::errors::SpatiaResult;
use crate::open_helper::Connection;
use std::sync::Arc;

/// Lifecycle hooks invoked while a database is being opened.
///
/// Callbacks run synchronously on the thread that requested the first
/// connection, in the order they were added to the builder. An error returned
/// from a hook is logged and the remaining callbacks still run, unless the
/// error kind is [`ErrorKind::FatalCallback`](crate::errors::ErrorKind::FatalCallback),
/// which aborts the open.
///
/// # Examples
///
/// ```rust
/// use spatia::common::DatabaseCallback;
/// use spatia::errors::SpatiaResult;
/// use spatia::open_helper::Connection;
///
/// struct SeedCallback;
///
/// impl DatabaseCallback for SeedCallback {
///     fn on_create(&self, connection: &mut dyn Connection) -> SpatiaResult<()> {
///         connection.execute_batch("INSERT INTO settings (key, value) VALUES ('theme', 'dark');")
///     }
/// }
/// ```
pub trait DatabaseCallback: Send + Sync {
    /// Called once, when the database is created for the first time, after
    /// all managed tables exist.
    fn on_create(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }

    /// Called on every successful open, after migrations or a destructive
    /// recreate have completed.
    fn on_open(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }

    /// Called after managed tables were dropped by a destructive fallback and
    /// before they are created again.
    fn on_destructive_migration(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }
}

/// Lifecycle hook selector used when dispatching to every registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackHook {
    Create,
    Open,
    DestructiveMigration,
}

impl CallbackHook {
    fn name(&self) -> &'static str {
        match self {
            CallbackHook::Create => "on_create",
            CallbackHook::Open => "on_open",
            CallbackHook::DestructiveMigration => "on_destructive_migration",
        }
    }
}

/// Runs `hook` on every callback in registration order.
///
/// Non-fatal errors are logged and skipped. The first fatal error stops the
/// sequence and is returned.
pub fn dispatch_callbacks(
    callbacks: &[Arc<dyn DatabaseCallback>],
    hook: CallbackHook,
    connection: &mut dyn Connection,
) -> SpatiaResult<()> {
    for (index, callback) in callbacks.iter().enumerate() {
        let result = match hook {
            CallbackHook::Create => callback.on_create(connection),
            CallbackHook::Open => callback.on_open(connection),
            CallbackHook::DestructiveMigration => callback.on_destructive_migration(connection),
        };

        if let Err(err) = result {
            if err.is_fatal() {
                log::error!("Callback #{} failed fatally in {}: {}", index, hook.name(), err);
                return Err(err);
            }
            log::warn!("Callback #{} failed in {}, continuing: {}", index, hook.name(), err);
        }
    }
    Ok(())
}
