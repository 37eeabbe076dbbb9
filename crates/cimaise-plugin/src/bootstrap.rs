//! Per-request bootstrap.
//!
//! A [`PluginKernel`] is built once per process. Each request calls
//! [`PluginKernel::begin_request`], which builds a fresh registry, loads
//! the active plugins into it and fires `cimaise_init`.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use cimaise_core::config::PluginConfig;
use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;

use crate::diagnostics::{Diagnostics, DiagnosticsReport};
use crate::hooks::definitions::{HookPoint, InitArgs};
use crate::hooks::registry::HookRegistry;
use crate::loader::{LoadedPlugin, PluginLoader};
use crate::manager::LifecycleManager;
use crate::registry::PluginFactoryRegistry;

/// Process-wide entry point of the plugin system.
#[derive(Debug, Clone)]
pub struct PluginKernel {
    db: DatabasePool,
    config: PluginConfig,
    loader: Arc<PluginLoader>,
    lifecycle: Arc<LifecycleManager>,
}

impl PluginKernel {
    pub fn new(db: DatabasePool, config: PluginConfig, factories: PluginFactoryRegistry) -> Self {
        let loader = Arc::new(PluginLoader::from_config(&config, factories));
        let lifecycle = Arc::new(LifecycleManager::new(db.clone(), loader.clone()));
        Self {
            db,
            config,
            loader,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    pub fn loader(&self) -> &Arc<PluginLoader> {
        &self.loader
    }

    pub fn db(&self) -> &DatabasePool {
        &self.db
    }

    /// Build the hook registry for one request.
    ///
    /// With `auto_load` disabled the registry stays empty.
    pub async fn begin_request(&self) -> AppResult<RequestScope> {
        let hooks = Arc::new(HookRegistry::new());

        let loaded = if self.config.auto_load {
            self.loader
                .load_active(&self.lifecycle, &hooks, &self.db, &BTreeSet::new())
                .await?
        } else {
            warn!("Plugin auto-load disabled, serving request without plugins");
            Vec::new()
        };

        let scope = RequestScope {
            hooks,
            loaded,
            db: self.db.clone(),
            lifecycle: self.lifecycle.clone(),
        };

        let args = InitArgs {
            db: self.db.clone(),
            lifecycle: self.lifecycle.clone(),
            loaded: scope.loaded_slugs(),
        };
        scope.hooks.do_action(HookPoint::CimaiseInit, &args);

        debug!(
            loaded = scope.loaded.len(),
            callbacks = scope.hooks.total_callbacks(),
            "Request bootstrap complete"
        );
        Ok(scope)
    }
}

/// Everything the plugin system contributes to a single request.
#[derive(Debug)]
pub struct RequestScope {
    hooks: Arc<HookRegistry>,
    loaded: Vec<LoadedPlugin>,
    db: DatabasePool,
    lifecycle: Arc<LifecycleManager>,
}

impl RequestScope {
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn loaded(&self) -> &[LoadedPlugin] {
        &self.loaded
    }

    pub fn loaded_slugs(&self) -> Vec<String> {
        self.loaded.iter().map(|p| p.slug().to_string()).collect()
    }

    pub fn do_action<A: 'static>(&self, hook: impl AsRef<str>, args: &A) -> usize {
        self.hooks.do_action(hook, args)
    }

    pub fn apply_filters<V, A>(&self, hook: impl AsRef<str>, value: V, args: &A) -> V
    where
        V: Clone + 'static,
        A: 'static,
    {
        self.hooks.apply_filters(hook, value, args)
    }

    pub async fn diagnostics(&self) -> AppResult<DiagnosticsReport> {
        Diagnostics::collect(&self.hooks, &self.lifecycle, &self.loaded).await
    }

    /// End the request, giving every loaded plugin a chance to flush state.
    /// Failures are logged per plugin and never returned.
    pub async fn finish(self) {
        for plugin in &self.loaded {
            if let Err(e) = plugin.plugin.finish(&self.db).await {
                warn!(plugin_id = %plugin.slug(), error = %e, "Plugin finish failed");
            }
        }
        info!(plugins = self.loaded.len(), "Request finished");
    }
}
