use super::connection::ConnectionRef;
use super::factory::{OpenHelperFactory, OpenHelperFactoryProvider, OpenHelperLayer};
use super::helper::{OpenHelper, OpenHelperConfiguration, OpenHelperProvider};
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Seeds a database file from a bundled asset before its first open.
///
/// The copy happens lazily, on the first request for a connection, and only
/// when the database file does not exist yet.
pub(crate) struct AssetSeedingLayer {
    asset_path: PathBuf,
}

impl AssetSeedingLayer {
    pub(crate) fn new(asset_path: PathBuf) -> Self {
        AssetSeedingLayer { asset_path }
    }
}

impl OpenHelperLayer for AssetSeedingLayer {
    fn wrap(&self, factory: OpenHelperFactory) -> OpenHelperFactory {
        OpenHelperFactory::new(AssetSeedingFactory {
            delegate: factory,
            asset_path: self.asset_path.clone(),
        })
    }
}

struct AssetSeedingFactory {
    delegate: OpenHelperFactory,
    asset_path: PathBuf,
}

impl OpenHelperFactoryProvider for AssetSeedingFactory {
    fn create(&self, config: OpenHelperConfiguration) -> SpatiaResult<OpenHelper> {
        let database_path = config.path().map(Path::to_path_buf);
        let delegate = self.delegate.create(config)?;
        Ok(OpenHelper::new(AssetSeedingOpenHelper {
            delegate,
            database_path,
            asset_path: self.asset_path.clone(),
            verified: Mutex::new(false),
        }))
    }
}

struct AssetSeedingOpenHelper {
    delegate: OpenHelper,
    database_path: Option<PathBuf>,
    asset_path: PathBuf,
    verified: Mutex<bool>,
}

impl AssetSeedingOpenHelper {
    fn seed_if_needed(&self) -> SpatiaResult<()> {
        let mut verified = self.verified.lock();
        if *verified {
            return Ok(());
        }

        if let Some(database_path) = &self.database_path {
            if !database_path.exists() {
                copy_asset(&self.asset_path, database_path)?;
            }
        }
        *verified = true;
        Ok(())
    }
}

fn staging_path(database_path: &Path) -> PathBuf {
    database_path.with_extension("asset-tmp")
}

fn copy_asset(asset_path: &Path, database_path: &Path) -> SpatiaResult<()> {
    log::debug!(
        "Seeding database {} from asset {}",
        database_path.display(),
        asset_path.display()
    );

    // stage next to the target, then rename into place
    let staging = staging_path(database_path);
    let copy = || -> std::io::Result<()> {
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(asset_path, &staging)?;
        std::fs::rename(&staging, database_path)
    };

    copy().map_err(|e| {
        if staging.exists() {
            if let Err(cleanup) = std::fs::remove_file(&staging) {
                log::warn!("Failed to remove staging file {}: {}", staging.display(), cleanup);
            }
        }
        log::error!(
            "Failed to copy asset {} to {}: {}",
            asset_path.display(),
            database_path.display(),
            e
        );
        SpatiaError::new_with_cause(
            &format!(
                "Failed to create database from asset {}",
                asset_path.display()
            ),
            ErrorKind::IOError,
            e.into(),
        )
    })
}

impl OpenHelperProvider for AssetSeedingOpenHelper {
    fn database_name(&self) -> Option<String> {
        self.delegate.database_name()
    }

    fn writable_connection(&self) -> SpatiaResult<ConnectionRef> {
        self.seed_if_needed()?;
        self.delegate.writable_connection()
    }

    fn is_open(&self) -> bool {
        self.delegate.is_open()
    }

    fn close(&self) -> SpatiaResult<()> {
        self.delegate.close()
    }
}
