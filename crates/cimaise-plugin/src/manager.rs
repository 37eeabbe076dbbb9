//! Lifecycle manager: install, activate, deactivate and uninstall.
//!
//! Persisted state is one row per installed plugin; no row means
//! uninstalled. Activation changes only take effect on the next request,
//! because every request builds its hook registry from scratch.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tracing::{info, warn};

use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;
use cimaise_database::repositories::PluginRepository;
use cimaise_entity::plugin::{NewPluginRecord, PluginRecord, PluginState};

use crate::error::{PluginError, panic_message};
use crate::hooks::registry::HookRegistry;
use crate::loader::PluginLoader;
use crate::manifest::PluginManifest;
use crate::traits::{Plugin, ScriptOutcome};

/// Result of a lifecycle operation, shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleOutcome {
    pub slug: String,
    /// State after the operation.
    pub state: PluginState,
    /// Whether persisted state changed.
    pub changed: bool,
    pub message: String,
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginStats {
    /// Installed plugins.
    pub total_plugins: u64,
    pub active_count: u64,
    /// Callbacks registered in the given request's registry.
    pub total_hooks_registered: usize,
}

/// One row of the "available plugins" listing.
#[derive(Debug, Clone, Serialize)]
pub struct PluginListing {
    #[serde(flatten)]
    pub manifest: PluginManifest,
    pub state: PluginState,
    pub installed_at: Option<DateTime<Utc>>,
    pub has_install_script: bool,
    pub has_uninstall_script: bool,
}

/// Owns the persisted plugin state and drives lifecycle transitions.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    db: DatabasePool,
    repo: PluginRepository,
    loader: Arc<PluginLoader>,
}

impl LifecycleManager {
    pub fn new(db: DatabasePool, loader: Arc<PluginLoader>) -> Self {
        let repo = PluginRepository::new(db.pool().clone());
        Self { db, repo, loader }
    }

    pub fn loader(&self) -> &Arc<PluginLoader> {
        &self.loader
    }

    /// Install a discovered plugin and mark it active.
    ///
    /// Installing an installed plugin changes nothing. A failing install
    /// script leaves no record behind and is returned as an error.
    pub async fn install(&self, slug: &str) -> AppResult<LifecycleOutcome> {
        if let Some(record) = self.repo.find(slug).await? {
            info!(plugin_id = %slug, "Plugin already installed, nothing to do");
            return Ok(LifecycleOutcome {
                slug: slug.to_string(),
                state: record.state(),
                changed: false,
                message: "Plugin already installed".to_string(),
            });
        }

        let manifest = self.loader.manifest(slug)?;
        let plugin = self.instantiate(slug, "install")?;
        let outcome = run_script(slug, "install", plugin.install(&self.db)).await?;

        let record = NewPluginRecord {
            slug: slug.to_string(),
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            author: manifest.author.clone(),
            path: self.loader.bundle_path(slug).display().to_string(),
            is_active: true,
        };

        // Another worker may have finished the same install in the meantime;
        // its record stands and the scripts are idempotent.
        let created = self.repo.insert_if_absent(&record).await?;
        let state = self.state(slug).await?;

        info!(
            plugin_id = %slug,
            version = %manifest.version,
            created = created,
            "Plugin installed"
        );

        Ok(LifecycleOutcome {
            slug: slug.to_string(),
            state,
            changed: created,
            message: if outcome.message.is_empty() {
                "Plugin installed successfully".to_string()
            } else {
                outcome.message
            },
        })
    }

    /// Mark an installed plugin active. Takes effect on the next request.
    pub async fn activate(&self, slug: &str) -> AppResult<LifecycleOutcome> {
        self.set_active(slug, true).await
    }

    /// Mark an installed plugin inactive. Takes effect on the next request.
    pub async fn deactivate(&self, slug: &str) -> AppResult<LifecycleOutcome> {
        self.set_active(slug, false).await
    }

    async fn set_active(&self, slug: &str, active: bool) -> AppResult<LifecycleOutcome> {
        let record = self.require_record(slug).await?;
        let changed = record.is_active != active;

        if changed {
            self.repo.set_active(slug, active).await?;
        }

        let verb = if active { "activated" } else { "deactivated" };
        info!(plugin_id = %slug, changed = changed, "Plugin {verb}");

        Ok(LifecycleOutcome {
            slug: slug.to_string(),
            state: if active {
                PluginState::Active
            } else {
                PluginState::Inactive
            },
            changed,
            message: if changed {
                format!("Plugin {verb}")
            } else {
                format!("Plugin already {verb}")
            },
        })
    }

    /// Run the uninstall script and forget the plugin.
    ///
    /// The record is deleted even when the script fails; the script failure
    /// is then returned so the admin sees it.
    pub async fn uninstall(&self, slug: &str) -> AppResult<LifecycleOutcome> {
        self.require_record(slug).await?;

        let script = match self.instantiate(slug, "uninstall") {
            Ok(plugin) => Some(run_script(slug, "uninstall", plugin.uninstall(&self.db)).await),
            Err(PluginError::MissingFactory { .. }) => {
                warn!(plugin_id = %slug, "No implementation registered, skipping uninstall script");
                None
            }
            Err(e) => Some(Err(e.into())),
        };

        self.repo.delete(slug).await?;
        info!(plugin_id = %slug, "Plugin record removed");

        let message = match script {
            Some(Err(e)) => return Err(e),
            Some(Ok(outcome)) if !outcome.message.is_empty() => outcome.message,
            _ => "Plugin uninstalled successfully".to_string(),
        };

        Ok(LifecycleOutcome {
            slug: slug.to_string(),
            state: PluginState::Uninstalled,
            changed: true,
            message,
        })
    }

    pub async fn is_active(&self, slug: &str) -> AppResult<bool> {
        Ok(self.repo.find(slug).await?.is_some_and(|r| r.is_active))
    }

    pub async fn state(&self, slug: &str) -> AppResult<PluginState> {
        Ok(self
            .repo
            .find(slug)
            .await?
            .map(|r| r.state())
            .unwrap_or(PluginState::Uninstalled))
    }

    pub async fn record(&self, slug: &str) -> AppResult<Option<PluginRecord>> {
        self.repo.find(slug).await
    }

    /// Installed plugins ordered by name.
    pub async fn installed(&self) -> AppResult<Vec<PluginRecord>> {
        self.repo.list_installed().await
    }

    pub async fn active_slugs(&self) -> AppResult<Vec<String>> {
        self.repo.active_slugs().await
    }

    /// Every discovered bundle joined with its persisted state.
    pub async fn catalog(&self) -> AppResult<Vec<PluginListing>> {
        let mut listings = Vec::new();
        for manifest in self.loader.discover() {
            let record = self.repo.find(&manifest.slug).await?;
            let plugin = self.loader.factories().try_create(&manifest.slug).ok().flatten();
            listings.push(PluginListing {
                state: record.as_ref().map(|r| r.state()).unwrap_or(PluginState::Uninstalled),
                installed_at: record.and_then(|r| r.installed_at),
                has_install_script: plugin.as_ref().is_some_and(|p| p.has_install_script()),
                has_uninstall_script: plugin.as_ref().is_some_and(|p| p.has_uninstall_script()),
                manifest,
            });
        }
        Ok(listings)
    }

    pub async fn get_stats(&self, hooks: &HookRegistry) -> AppResult<PluginStats> {
        Ok(PluginStats {
            total_plugins: self.repo.count().await?,
            active_count: self.repo.count_active().await?,
            total_hooks_registered: hooks.total_callbacks(),
        })
    }

    async fn require_record(&self, slug: &str) -> AppResult<PluginRecord> {
        self.repo.find(slug).await?.ok_or_else(|| {
            PluginError::NotInstalled {
                slug: slug.to_string(),
            }
            .into()
        })
    }

    /// Build an instance for a lifecycle script. A panicking factory is
    /// reported as a failure of that script.
    fn instantiate(&self, slug: &str, script: &'static str) -> Result<Arc<dyn Plugin>, PluginError> {
        match self.loader.factories().try_create(slug) {
            Ok(Some(plugin)) => Ok(plugin),
            Ok(None) => Err(PluginError::MissingFactory {
                slug: slug.to_string(),
            }),
            Err(message) => {
                warn!(plugin_id = %slug, script = script, error = %message, "Plugin factory panicked");
                Err(PluginError::LifecycleScript {
                    slug: slug.to_string(),
                    script,
                    message: format!("factory panicked: {message}"),
                })
            }
        }
    }
}

/// Await a lifecycle script, turning `Err`, a panic, or an unsuccessful
/// outcome into a [`PluginError::LifecycleScript`].
async fn run_script<F>(slug: &str, script: &'static str, fut: F) -> AppResult<ScriptOutcome>
where
    F: std::future::Future<Output = AppResult<ScriptOutcome>>,
{
    let failure = |message: String| PluginError::LifecycleScript {
        slug: slug.to_string(),
        script,
        message,
    };

    let result = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(outcome)) if outcome.success => Ok(outcome),
        Ok(Ok(outcome)) => Err(failure(outcome.message)),
        Ok(Err(e)) => Err(failure(e.to_string())),
        Err(payload) => Err(failure(format!("panicked: {}", panic_message(payload.as_ref())))),
    };

    match result {
        Ok(outcome) => {
            info!(plugin_id = %slug, script = script, message = %outcome.message, "Lifecycle script completed");
            Ok(outcome)
        }
        Err(err) => {
            warn!(plugin_id = %slug, script = script, error = %err, "Lifecycle script failed");
            Err(err.into())
        }
    }
}
