//! Plugin status row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::state::PluginState;

/// Persisted install/activation state of one plugin, keyed by slug.
///
/// Absence of a row means the plugin is not installed. The manifest fields
/// are a snapshot taken at install time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginRecord {
    /// Plugin slug (bundle directory name).
    pub slug: String,
    /// Display name from the manifest.
    pub name: String,
    /// Version from the manifest.
    pub version: String,
    pub description: String,
    pub author: String,
    /// Bundle path at install time.
    pub path: String,
    /// Whether the plugin participates in request handling.
    #[sqlx(rename = "is_active")]
    #[serde(rename = "active")]
    pub is_active: bool,
    /// When the install script last completed successfully.
    pub installed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl PluginRecord {
    /// Lifecycle state represented by this row.
    pub fn state(&self) -> PluginState {
        if self.is_active {
            PluginState::Active
        } else {
            PluginState::Inactive
        }
    }
}

/// Data required to create a plugin record after a successful install.
#[derive(Debug, Clone)]
pub struct NewPluginRecord {
    pub slug: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub path: String,
    pub is_active: bool,
}
