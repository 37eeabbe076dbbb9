//! Plugin entry point and hook wiring.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use cimaise_database::repositories::SettingRepository;
use cimaise_plugin::prelude::*;

use crate::settings::{self, MaintenanceSettings};

/// Bundle directory name.
pub const SLUG: &str = "maintenance-mode";

pub const VERSION: &str = "1.0.0";

pub const ROBOTS_NOINDEX: &str = "noindex,nofollow";

#[derive(Debug, Default)]
pub struct MaintenanceModePlugin;

impl MaintenanceModePlugin {
    pub fn new() -> Self {
        Self
    }

    pub fn factory() -> Arc<dyn Plugin> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Plugin for MaintenanceModePlugin {
    async fn init(&self, ctx: &PluginContext) -> AppResult<()> {
        // Snapshot for this request; toggling takes effect on the next one.
        let enabled = MaintenanceSettings::load(ctx.db()).await?.enabled;

        ctx.add_filter(
            HookPoint::SettingsTabs,
            |mut tabs: BTreeMap<String, SettingsTab>, _: &()| {
                tabs.insert("maintenance".to_string(), settings_tab());
                Ok(tabs)
            },
        );

        ctx.add_filter(HookPoint::RobotsMeta, move |robots: String, _: &()| {
            Ok(if enabled { ROBOTS_NOINDEX.to_string() } else { robots })
        });

        ctx.add_filter(
            HookPoint::ResponseHeaders,
            move |mut headers: Vec<(String, String)>, _: &()| {
                if enabled {
                    headers.push(("X-Robots-Tag".to_string(), "noindex, nofollow".to_string()));
                }
                Ok(headers)
            },
        );

        ctx.add_action_at(HookPoint::CimaiseInit, 5, move |_: &InitArgs| {
            if enabled {
                warn!(plugin_id = SLUG, "Maintenance mode is enabled, visitors see the maintenance page");
            }
            Ok(())
        });

        info!(plugin_id = SLUG, version = VERSION, enabled = enabled, "Maintenance mode plugin initialized");
        Ok(())
    }

    fn has_install_script(&self) -> bool {
        true
    }

    /// Seed defaults, leaving values an admin already configured alone.
    async fn install(&self, db: &DatabasePool) -> AppResult<ScriptOutcome> {
        let repo = SettingRepository::new(db.pool().clone());
        let mut seeded = 0;
        for (key, value) in settings::defaults() {
            if repo.insert_if_absent(key, &value).await? {
                seeded += 1;
            }
        }
        Ok(ScriptOutcome::ok(format!(
            "Maintenance Mode installed ({seeded} settings initialised)"
        )))
    }

    fn has_uninstall_script(&self) -> bool {
        true
    }

    async fn uninstall(&self, db: &DatabasePool) -> AppResult<ScriptOutcome> {
        let repo = SettingRepository::new(db.pool().clone());
        let removed = repo.delete_keys(&settings::KEYS).await?;
        Ok(ScriptOutcome::ok(format!(
            "Maintenance Mode uninstalled ({removed} settings removed)"
        )))
    }
}

fn settings_tab() -> SettingsTab {
    SettingsTab {
        title: "Maintenance Mode".to_string(),
        icon: "tools".to_string(),
        description: "Control site access during maintenance".to_string(),
        fields: vec![
            SettingsField::new(settings::ENABLED, "checkbox", "Enable Maintenance Mode", json!(false))
                .describe("Only logged-in admins can browse the site while enabled"),
            SettingsField::new(settings::TITLE, "text", "Page Title", json!(""))
                .describe("Leave empty to use the site title"),
            SettingsField::new(
                settings::MESSAGE,
                "textarea",
                "Message",
                json!(settings::DEFAULT_MESSAGE),
            ),
            SettingsField::new(settings::SHOW_LOGO, "checkbox", "Show Logo", json!(true)),
            SettingsField::new(
                settings::SHOW_COUNTDOWN,
                "checkbox",
                "Show Countdown",
                json!(true),
            )
            .describe("Show an \"under construction\" notice with a countdown"),
        ],
    }
}
