use super::connection::Connection;
use super::helper::OpenHelperConfiguration;
use crate::common::NO_VERSION;
use crate::errors::SpatiaResult;

/// Open-time hooks an engine calls while opening a connection.
///
/// Engines never call these directly; they hand the fresh connection to
/// [`drive_open`], which decides which hook applies from the version header.
/// Factory layers wrap the callback to run their own work around the
/// delegate's.
pub trait OpenHelperCallback: Send + Sync {
    /// Called first on every open, before the version header is read.
    fn on_configure(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }

    /// Called when the version header is absent.
    fn on_create(&self, connection: &mut dyn Connection) -> SpatiaResult<()>;

    /// Called when the version header is below the requested version.
    fn on_upgrade(&self, connection: &mut dyn Connection, old_version: u32, new_version: u32) -> SpatiaResult<()>;

    /// Called when the version header is above the requested version.
    fn on_downgrade(&self, connection: &mut dyn Connection, old_version: u32, new_version: u32) -> SpatiaResult<()>;

    /// Called last on every successful open.
    fn on_open(&self, _connection: &mut dyn Connection) -> SpatiaResult<()> {
        Ok(())
    }
}

/// Runs the open sequence on a freshly opened connection.
///
/// Applies the configured journal mode, then calls `on_configure`, the hook
/// matching the version header, and finally `on_open`. The first error stops
/// the sequence; the engine must then discard the connection.
pub fn drive_open(connection: &mut dyn Connection, config: &OpenHelperConfiguration) -> SpatiaResult<()> {
    let callback = config.callback();
    connection.set_journal_mode(config.journal_mode())?;
    callback.on_configure(connection)?;

    let current = connection.version()?;
    let target = config.version();
    if current == NO_VERSION {
        callback.on_create(connection)?;
    } else if current < target {
        callback.on_upgrade(connection, current, target)?;
    } else if current > target {
        callback.on_downgrade(connection, current, target)?;
    }

    callback.on_open(connection)
}
