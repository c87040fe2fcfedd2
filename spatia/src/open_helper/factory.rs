use super::helper::{OpenHelper, OpenHelperConfiguration};
use crate::errors::SpatiaResult;
use std::ops::Deref;
use std::sync::Arc;

/// Creates open helpers for one storage engine.
pub trait OpenHelperFactoryProvider: Send + Sync {
    fn create(&self, config: OpenHelperConfiguration) -> SpatiaResult<OpenHelper>;
}

/// Shared handle to an open-helper factory.
///
/// # Examples
///
/// ```rust
/// use spatia::open_helper::memory::InMemoryOpenHelperFactory;
/// use spatia::open_helper::OpenHelperFactory;
///
/// let factory = OpenHelperFactory::new(InMemoryOpenHelperFactory::new());
/// let same = factory.clone();
/// ```
#[derive(Clone)]
pub struct OpenHelperFactory {
    inner: Arc<dyn OpenHelperFactoryProvider>,
}

impl OpenHelperFactory {
    pub fn new<T: OpenHelperFactoryProvider + 'static>(inner: T) -> Self {
        OpenHelperFactory { inner: Arc::new(inner) }
    }
}

impl Deref for OpenHelperFactory {
    type Target = Arc<dyn OpenHelperFactoryProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Decorates a factory.
///
/// A layer usually returns a factory that creates the inner factory's
/// helper with a wrapped [`OpenHelperCallback`](super::OpenHelperCallback),
/// so it can act on every connection before the delegate callback runs.
pub trait OpenHelperLayer: Send + Sync {
    fn wrap(&self, factory: OpenHelperFactory) -> OpenHelperFactory;
}
