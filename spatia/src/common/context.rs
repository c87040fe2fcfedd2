use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Detects whether the calling thread is the application's main thread.
pub type MainThreadDetector = Arc<dyn Fn() -> bool + Send + Sync>;

/// Application environment a database is built in.
///
/// The context resolves database names to files, locates bundled assets used
/// to seed new databases, and optionally tells the database whether it is
/// being used from the main thread.
///
/// # Examples
///
/// ```rust
/// use spatia::common::Context;
///
/// let context = Context::new("/var/lib/app/databases")
///     .with_assets_dir("/usr/share/app/assets");
/// assert!(context.database_path("places.db").ends_with("databases/places.db"));
/// ```
#[derive(Clone)]
pub struct Context {
    database_dir: PathBuf,
    assets_dir: Option<PathBuf>,
    main_thread_detector: Option<MainThreadDetector>,
}

impl Context {
    pub fn new(database_dir: impl AsRef<Path>) -> Self {
        Context {
            database_dir: database_dir.as_ref().to_path_buf(),
            assets_dir: None,
            main_thread_detector: None,
        }
    }

    pub fn with_assets_dir(mut self, assets_dir: impl AsRef<Path>) -> Self {
        self.assets_dir = Some(assets_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_main_thread_detector<F>(mut self, detector: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.main_thread_detector = Some(Arc::new(detector));
        self
    }

    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    /// Resolves a database name to its file path.
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.database_dir.join(name)
    }

    /// Resolves a path relative to the assets directory.
    ///
    /// Falls back to the database directory when no assets directory was set.
    pub fn asset_path(&self, relative_path: &str) -> PathBuf {
        match &self.assets_dir {
            Some(dir) => dir.join(relative_path),
            None => self.database_dir.join(relative_path),
        }
    }

    /// Returns `true` only when a detector is installed and reports the main
    /// thread.
    pub fn is_main_thread(&self) -> bool {
        self.main_thread_detector
            .as_ref()
            .map(|detector| detector())
            .unwrap_or(false)
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("database_dir", &self.database_dir)
            .field("assets_dir", &self.assets_dir)
            .field("main_thread_detector", &self.main_thread_detector.is_some())
            .finish()
    }
}
