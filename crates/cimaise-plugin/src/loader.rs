//! Plugin loader: discovers bundles and loads the active set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use cimaise_core::config::PluginConfig;
use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;

use crate::api::context::PluginContext;
use crate::error::{PluginError, panic_message};
use crate::hooks::registry::HookRegistry;
use crate::manager::LifecycleManager;
use crate::manifest::{PluginManifest, read_manifest};
use crate::registry::PluginFactoryRegistry;
use crate::traits::Plugin;

/// A plugin that registered itself successfully for the current request.
#[derive(Clone)]
pub struct LoadedPlugin {
    pub manifest: PluginManifest,
    pub plugin: Arc<dyn Plugin>,
}

impl LoadedPlugin {
    pub fn slug(&self) -> &str {
        &self.manifest.slug
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("slug", &self.manifest.slug)
            .field("version", &self.manifest.version)
            .finish()
    }
}

/// Scans the plugins directory and turns active bundles into registered hooks.
#[derive(Debug, Clone)]
pub struct PluginLoader {
    directory: PathBuf,
    entry_file: String,
    factories: PluginFactoryRegistry,
}

impl PluginLoader {
    pub fn new(
        directory: impl Into<PathBuf>,
        entry_file: impl Into<String>,
        factories: PluginFactoryRegistry,
    ) -> Self {
        Self {
            directory: directory.into(),
            entry_file: entry_file.into(),
            factories,
        }
    }

    pub fn from_config(config: &PluginConfig, factories: PluginFactoryRegistry) -> Self {
        Self::new(&config.directory, &config.entry_file, factories)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn factories(&self) -> &PluginFactoryRegistry {
        &self.factories
    }

    /// Path of a bundle's directory.
    pub fn bundle_path(&self, slug: &str) -> PathBuf {
        self.directory.join(slug)
    }

    /// Catalog of every parseable bundle, sorted by slug, regardless of
    /// install state. Broken bundles are logged and left out.
    pub fn discover(&self) -> Vec<PluginManifest> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    directory = %self.directory.display(),
                    error = %e,
                    "Plugin directory not readable, catalog is empty"
                );
                return Vec::new();
            }
        };

        let mut catalog = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(slug) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };

            let entry_path = path.join(&self.entry_file);
            if !entry_path.is_file() {
                debug!(plugin_id = %slug, "Directory has no entry file, skipping");
                continue;
            }

            match read_manifest(&entry_path, &slug) {
                Ok(manifest) => catalog.push(manifest),
                Err(e) => warn!(plugin_id = %slug, error = %e, "Skipping unparseable plugin bundle"),
            }
        }

        catalog.sort_by(|a, b| a.slug.cmp(&b.slug));
        catalog
    }

    /// Manifest of a single bundle, if it exists and parses.
    pub fn manifest(&self, slug: &str) -> Result<PluginManifest, PluginError> {
        let entry_path = self.bundle_path(slug).join(&self.entry_file);
        if !entry_path.is_file() {
            return Err(PluginError::NotFound {
                slug: slug.to_string(),
            });
        }
        read_manifest(&entry_path, slug)
    }

    /// Load every active plugin into `hooks`, skipping slugs in
    /// `already_loaded` so a bundle is initialised at most once per request.
    ///
    /// A plugin whose factory is missing, or whose `init` fails or panics,
    /// is logged and skipped; any hooks it registered before failing are
    /// removed. Only a failure to read persisted state is returned.
    pub async fn load_active(
        &self,
        lifecycle: &LifecycleManager,
        hooks: &Arc<HookRegistry>,
        db: &DatabasePool,
        already_loaded: &BTreeSet<String>,
    ) -> AppResult<Vec<LoadedPlugin>> {
        let active = lifecycle.active_slugs().await?;
        if active.is_empty() {
            debug!("No active plugins");
            return Ok(Vec::new());
        }

        let catalog: BTreeMap<String, PluginManifest> = self
            .discover()
            .into_iter()
            .map(|m| (m.slug.clone(), m))
            .collect();

        let mut loaded = Vec::new();
        for slug in active {
            if already_loaded.contains(&slug) || loaded.iter().any(|p: &LoadedPlugin| p.slug() == slug) {
                continue;
            }

            let Some(manifest) = catalog.get(&slug).cloned() else {
                let err = PluginError::Load {
                    slug: slug.clone(),
                    message: "active but no valid bundle on disk".to_string(),
                };
                warn!(plugin_id = %slug, error = %err, "Skipping active plugin");
                continue;
            };

            match self.load_one(manifest, hooks, db).await {
                Ok(plugin) => loaded.push(plugin),
                Err(err) => {
                    let removed = hooks.remove_plugin_hooks(&slug);
                    error!(
                        plugin_id = %slug,
                        error = %err,
                        hooks_removed = removed,
                        "Plugin failed to load, skipped for this request"
                    );
                }
            }
        }

        info!(
            loaded = loaded.len(),
            hooks = hooks.list_hooks().len(),
            callbacks = hooks.total_callbacks(),
            "Active plugins loaded"
        );
        Ok(loaded)
    }

    async fn load_one(
        &self,
        manifest: PluginManifest,
        hooks: &Arc<HookRegistry>,
        db: &DatabasePool,
    ) -> Result<LoadedPlugin, PluginError> {
        let slug = manifest.slug.clone();
        let load_error = |message: String| PluginError::Load {
            slug: slug.clone(),
            message,
        };

        let plugin = self
            .factories
            .try_create(&slug)
            .map_err(|message| load_error(format!("factory panicked: {message}")))?
            .ok_or_else(|| load_error("no implementation registered".to_string()))?;

        let ctx = PluginContext::new(manifest.clone(), hooks.clone(), db.clone());
        match AssertUnwindSafe(plugin.init(&ctx)).catch_unwind().await {
            Ok(Ok(())) => {
                debug!(
                    plugin_id = %slug,
                    version = %manifest.version,
                    callbacks = hooks.count_owned_by(&slug),
                    "Plugin initialised"
                );
                Ok(LoadedPlugin { manifest, plugin })
            }
            Ok(Err(e)) => Err(load_error(e.to_string())),
            Err(payload) => Err(load_error(format!(
                "init panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}
