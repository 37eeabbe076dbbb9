//! Plugin-owned settings keys and their defaults.

use serde::Serialize;
use serde_json::{Value, json};

use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;
use cimaise_database::repositories::SettingRepository;

pub const ENABLED: &str = "maintenance.enabled";
pub const TITLE: &str = "maintenance.title";
pub const MESSAGE: &str = "maintenance.message";
pub const SHOW_LOGO: &str = "maintenance.show_logo";
pub const SHOW_COUNTDOWN: &str = "maintenance.show_countdown";

/// Every key this plugin writes; uninstall removes exactly these.
pub const KEYS: [&str; 5] = [ENABLED, TITLE, MESSAGE, SHOW_LOGO, SHOW_COUNTDOWN];

pub const DEFAULT_MESSAGE: &str =
    "We are currently working on some improvements. Please check back soon!";

/// Values seeded on install.
pub fn defaults() -> [(&'static str, Value); 5] {
    [
        (ENABLED, json!(false)),
        (TITLE, json!("")),
        (MESSAGE, json!(DEFAULT_MESSAGE)),
        (SHOW_LOGO, json!(true)),
        (SHOW_COUNTDOWN, json!(true)),
    ]
}

/// Current maintenance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    pub title: String,
    pub message: String,
    pub show_logo: bool,
    pub show_countdown: bool,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            title: String::new(),
            message: DEFAULT_MESSAGE.to_string(),
            show_logo: true,
            show_countdown: true,
        }
    }
}

impl MaintenanceSettings {
    /// Read settings, falling back to defaults for missing keys.
    pub async fn load(db: &DatabasePool) -> AppResult<Self> {
        let repo = SettingRepository::new(db.pool().clone());
        let defaults = Self::default();

        Ok(Self {
            enabled: truthy(repo.get(ENABLED).await?).unwrap_or(defaults.enabled),
            title: text(repo.get(TITLE).await?).unwrap_or(defaults.title),
            message: text(repo.get(MESSAGE).await?).unwrap_or(defaults.message),
            show_logo: truthy(repo.get(SHOW_LOGO).await?).unwrap_or(defaults.show_logo),
            show_countdown: truthy(repo.get(SHOW_COUNTDOWN).await?)
                .unwrap_or(defaults.show_countdown),
        })
    }
}

/// What the maintenance page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenancePage {
    pub title: String,
    pub has_custom_title: bool,
    pub message: String,
    pub show_logo: bool,
    pub show_countdown: bool,
    pub site_title: String,
    pub site_logo: Option<String>,
    pub admin_login_text: String,
}

impl MaintenancePage {
    /// Assemble the page from maintenance and site settings. Any failure
    /// yields a generic page rather than an error.
    pub async fn load(db: &DatabasePool) -> Self {
        match Self::try_load(db).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(plugin_id = crate::SLUG, error = %e, "Falling back to default maintenance page");
                Self {
                    title: "Site Under Construction".to_string(),
                    has_custom_title: false,
                    message: DEFAULT_MESSAGE.to_string(),
                    show_logo: false,
                    show_countdown: true,
                    site_title: "Cimaise".to_string(),
                    site_logo: None,
                    admin_login_text: "Admin Login".to_string(),
                }
            }
        }
    }

    async fn try_load(db: &DatabasePool) -> AppResult<Self> {
        let settings = MaintenanceSettings::load(db).await?;
        let repo = SettingRepository::new(db.pool().clone());

        let site_title = text(repo.get("site.title").await?).unwrap_or_else(|| "Cimaise".to_string());
        let language = text(repo.get("site.language").await?).unwrap_or_else(|| "en".to_string());
        let custom_title = settings.title.trim().to_string();

        Ok(Self {
            has_custom_title: !custom_title.is_empty(),
            title: if custom_title.is_empty() {
                site_title.clone()
            } else {
                custom_title
            },
            message: settings.message,
            show_logo: settings.show_logo,
            show_countdown: settings.show_countdown,
            site_title,
            site_logo: text(repo.get("site.logo").await?).filter(|s| !s.is_empty()),
            admin_login_text: if language == "it" {
                "Accesso Admin".to_string()
            } else {
                "Admin Login".to_string()
            },
        })
    }
}

fn truthy(value: Option<Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(s) => Some(matches!(s.as_str(), "1" | "true" | "on" | "yes")),
        Value::Null => None,
        _ => Some(true),
    }
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
