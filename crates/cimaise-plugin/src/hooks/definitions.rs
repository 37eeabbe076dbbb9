//! Well-known hook names and the payload types they carry.
//!
//! Plugins may also fire and listen on free-form hook names; the registry
//! accepts any `AsRef<str>`. The enum below is the catalog the core fires.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cimaise_database::DatabasePool;

use crate::manager::LifecycleManager;

/// Extension points fired by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    // ── Bootstrap ──
    /// Action, fired once per request after active plugins are loaded.
    /// Args: [`InitArgs`].
    CimaiseInit,

    // ── Admin UI ──
    /// Filter over `Vec<MenuItem>`.
    AdminMenuItems,
    /// Filter over `Vec<DashboardWidget>`.
    AdminDashboardWidgets,
    /// Filter over `BTreeMap<String, SettingsTab>` keyed by tab id.
    SettingsTabs,

    // ── Content events ──
    /// Action. Args: [`AlbumCreated`].
    AlbumAfterCreate,
    /// Action. Args: [`ImageUploaded`].
    ImageAfterUpload,
    /// Action. Args: [`UserLoggedIn`].
    UserAfterLogin,

    // ── Rendering ──
    /// Filter over the rendered footer HTML `String`.
    FooterContent,
    /// Filter over the robots meta directive `String`.
    RobotsMeta,
    /// Filter over extra response headers `Vec<(String, String)>`.
    ResponseHeaders,
}

impl HookPoint {
    /// Every hook the core fires.
    pub const ALL: [HookPoint; 10] = [
        Self::CimaiseInit,
        Self::AdminMenuItems,
        Self::AdminDashboardWidgets,
        Self::SettingsTabs,
        Self::AlbumAfterCreate,
        Self::ImageAfterUpload,
        Self::UserAfterLogin,
        Self::FooterContent,
        Self::RobotsMeta,
        Self::ResponseHeaders,
    ];

    /// Returns the wire name of this hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CimaiseInit => "cimaise_init",
            Self::AdminMenuItems => "admin_menu_items",
            Self::AdminDashboardWidgets => "admin_dashboard_widgets",
            Self::SettingsTabs => "settings_tabs",
            Self::AlbumAfterCreate => "album_after_create",
            Self::ImageAfterUpload => "image_after_upload",
            Self::UserAfterLogin => "user_after_login",
            Self::FooterContent => "footer_content",
            Self::RobotsMeta => "robots_meta",
            Self::ResponseHeaders => "response_headers",
        }
    }

    /// Look up a well-known hook by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

impl AsRef<str> for HookPoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of the `cimaise_init` action.
#[derive(Clone)]
pub struct InitArgs {
    /// Shared database handle.
    pub db: DatabasePool,
    /// Lifecycle manager, for plugins that inspect plugin state.
    pub lifecycle: Arc<LifecycleManager>,
    /// Slugs loaded for this request, in load order.
    pub loaded: Vec<String>,
}

impl fmt::Debug for InitArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitArgs")
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

/// Entry of the admin sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    pub url: String,
    /// Icon class, e.g. `"fas fa-hand-wave"`.
    pub icon: String,
    /// Sort position; higher sinks to the bottom.
    pub position: i32,
}

/// Widget rendered on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardWidget {
    pub id: String,
    pub title: String,
    /// Template or renderer key understood by the admin UI.
    pub template: String,
    /// Grid width hint.
    pub size: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Tab of the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsTab {
    pub title: String,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub fields: Vec<SettingsField>,
}

/// One input on a settings tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsField {
    /// Settings key the input is bound to.
    pub key: String,
    /// Input type: `checkbox`, `text`, `textarea`, `select`.
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: serde_json::Value,
}

impl SettingsField {
    pub fn new(
        key: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
        default: serde_json::Value,
    ) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
            label: label.into(),
            description: String::new(),
            default,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Args of `album_after_create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCreated {
    pub album_id: i64,
    pub title: String,
    pub user_id: Option<i64>,
}

/// Args of `image_after_upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUploaded {
    pub image_id: i64,
    pub album_id: Option<i64>,
    pub filename: String,
    pub user_id: Option<i64>,
}

/// Args of `user_after_login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLoggedIn {
    pub user_id: i64,
    pub username: String,
    pub session_id: Option<String>,
}
