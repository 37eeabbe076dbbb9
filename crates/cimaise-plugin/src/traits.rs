//! The capability every plugin implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;

use crate::api::context::PluginContext;

/// Result shape of an install or uninstall script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptOutcome {
    pub success: bool,
    pub message: String,
}

impl ScriptOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A plugin compiled into the application.
///
/// `init` runs once per request for every active plugin and is where hooks
/// are registered. Install and uninstall scripts run only on lifecycle
/// transitions and must be idempotent: they may run more than once, or
/// concurrently from two workers.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Register this plugin's hooks for the current request.
    async fn init(&self, ctx: &PluginContext) -> AppResult<()>;

    /// Whether [`Plugin::install`] does any work.
    fn has_install_script(&self) -> bool {
        false
    }

    /// Create plugin-owned tables and seed settings.
    async fn install(&self, _db: &DatabasePool) -> AppResult<ScriptOutcome> {
        Ok(ScriptOutcome::ok("No install script"))
    }

    /// Whether [`Plugin::uninstall`] does any work.
    fn has_uninstall_script(&self) -> bool {
        false
    }

    /// Drop plugin-owned tables and settings. Must not touch core tables.
    async fn uninstall(&self, _db: &DatabasePool) -> AppResult<ScriptOutcome> {
        Ok(ScriptOutcome::ok("No uninstall script"))
    }

    /// Called when the request that loaded this plugin ends.
    async fn finish(&self, _db: &DatabasePool) -> AppResult<()> {
        Ok(())
    }
}
