//! Compiled-in plugin implementations, keyed by slug.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::panic_message;
use crate::traits::Plugin;

type PluginFactory = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Maps a bundle slug to the code that implements it.
///
/// The loader asks the factory for a fresh instance on every request, so
/// per-request plugin state never leaks into the next request.
#[derive(Clone, Default)]
pub struct PluginFactoryRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration for the same slug replaces
    /// the earlier one.
    pub fn register<F>(&mut self, slug: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(slug.into(), Arc::new(factory));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<F>(mut self, slug: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.register(slug, factory);
        self
    }

    /// Produce a new instance for the slug.
    pub fn create(&self, slug: &str) -> Option<Arc<dyn Plugin>> {
        self.factories.get(slug).map(|factory| factory())
    }

    /// Like [`create`](Self::create), but a panicking factory yields its
    /// panic message instead of unwinding into the caller.
    pub fn try_create(&self, slug: &str) -> Result<Option<Arc<dyn Plugin>>, String> {
        std::panic::catch_unwind(AssertUnwindSafe(|| self.create(slug)))
            .map_err(|payload| panic_message(payload.as_ref()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.factories.contains_key(slug)
    }

    /// Registered slugs in sorted order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PluginFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactoryRegistry")
            .field("slugs", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
