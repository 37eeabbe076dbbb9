//! Plugin context: what a plugin sees while registering itself.

use std::fmt;
use std::sync::Arc;

use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;

use crate::hooks::registry::{DEFAULT_PRIORITY, HookId, HookRegistry};
use crate::manifest::PluginManifest;

/// Passed to [`Plugin::init`](crate::traits::Plugin::init).
///
/// Registration helpers stamp the plugin's slug as the owner of every
/// callback so failures and diagnostics can be attributed.
#[derive(Clone)]
pub struct PluginContext {
    slug: String,
    manifest: PluginManifest,
    hooks: Arc<HookRegistry>,
    db: DatabasePool,
}

impl PluginContext {
    pub fn new(manifest: PluginManifest, hooks: Arc<HookRegistry>, db: DatabasePool) -> Self {
        Self {
            slug: manifest.slug.clone(),
            manifest,
            hooks,
            db,
        }
    }

    /// Slug of the plugin being initialised.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    /// The request's hook registry, for plugins that fire their own hooks.
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Shared database handle.
    pub fn db(&self) -> &DatabasePool {
        &self.db
    }

    /// Register an action at the default priority.
    pub fn add_action<A, F>(&self, hook: impl AsRef<str>, callback: F) -> HookId
    where
        A: 'static,
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.add_action_at(hook, DEFAULT_PRIORITY, callback)
    }

    pub fn add_action_at<A, F>(&self, hook: impl AsRef<str>, priority: i32, callback: F) -> HookId
    where
        A: 'static,
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.hooks.add_action(hook, priority, self.slug.as_str(), callback)
    }

    /// Register a filter at the default priority.
    pub fn add_filter<V, A, F>(&self, hook: impl AsRef<str>, callback: F) -> HookId
    where
        V: 'static,
        A: 'static,
        F: Fn(V, &A) -> AppResult<V> + Send + Sync + 'static,
    {
        self.add_filter_at(hook, DEFAULT_PRIORITY, callback)
    }

    pub fn add_filter_at<V, A, F>(&self, hook: impl AsRef<str>, priority: i32, callback: F) -> HookId
    where
        V: 'static,
        A: 'static,
        F: Fn(V, &A) -> AppResult<V> + Send + Sync + 'static,
    {
        self.hooks.add_filter(hook, priority, self.slug.as_str(), callback)
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("slug", &self.slug)
            .finish_non_exhaustive()
    }
}
