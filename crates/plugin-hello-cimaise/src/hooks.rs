//! Hook callbacks of the Hello Cimaise plugin.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::info;

use cimaise_plugin::HookRegistry;
use cimaise_plugin::hooks::definitions::{
    AlbumCreated, InitArgs, MenuItem, SettingsField, SettingsTab,
};

use crate::plugin::{SLUG, VERSION};

/// `cimaise_init`: log boot and how many callbacks are registered.
pub fn on_app_init(args: &InitArgs, registry: Option<&HookRegistry>) {
    info!(plugin_id = SLUG, loaded = ?args.loaded, "Hello Cimaise: application initialized");

    if let Some(registry) = registry {
        info!(
            plugin_id = SLUG,
            total_hooks = registry.list_hooks().len(),
            total_callbacks = registry.total_callbacks(),
            "Hello Cimaise: hook registry stats"
        );
    }
}

/// `admin_menu_items`: add an entry at the bottom of the menu.
pub fn add_menu_item(mut items: Vec<MenuItem>) -> Vec<MenuItem> {
    items.push(MenuItem {
        title: "Hello Plugin".to_string(),
        url: "/admin/hello-plugin".to_string(),
        icon: "👋".to_string(),
        position: 999,
    });
    items
}

/// `settings_tabs`: add the plugin's own tab.
pub fn add_settings_tab(mut tabs: BTreeMap<String, SettingsTab>) -> BTreeMap<String, SettingsTab> {
    tabs.insert(
        "hello".to_string(),
        SettingsTab {
            title: "Hello Plugin".to_string(),
            icon: "hand-wave".to_string(),
            description: "Settings for Hello Cimaise plugin".to_string(),
            fields: vec![
                SettingsField::new("hello_enabled", "checkbox", "Enable Hello Plugin", json!(true))
                    .describe("Turn on/off the Hello plugin features"),
                SettingsField::new(
                    "hello_message",
                    "text",
                    "Welcome Message",
                    json!("Powered by Hello Cimaise Plugin!"),
                )
                .describe("Custom message shown in footer"),
                SettingsField::new("hello_log_level", "select", "Log Level", json!("info"))
                    .describe("How verbose should logging be?"),
            ],
        },
    );
    tabs
}

/// `album_after_create`: log the new album.
pub fn log_album_creation(album: &AlbumCreated) {
    let title = if album.title.is_empty() {
        "Unknown"
    } else {
        album.title.as_str()
    };
    info!(
        plugin_id = SLUG,
        album_id = album.album_id,
        title = %title,
        "Hello Cimaise: new album created"
    );
}

/// `footer_content`: append the plugin's banner.
pub fn add_footer_message(html: String) -> String {
    format!(
        "{html}<div class=\"hello-plugin-footer\"><p>👋 Powered by Hello Cimaise Plugin v{VERSION}</p></div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use cimaise_plugin::hooks::definitions::HookPoint;
    use cimaise_plugin::manifest::parse_manifest;
    use cimaise_plugin::{Plugin, PluginContext};

    use crate::HelloCimaisePlugin;

    #[test]
    fn menu_item_is_appended() {
        let existing = MenuItem {
            title: "Albums".into(),
            url: "/admin/albums".into(),
            icon: "images".into(),
            position: 10,
        };
        let items = add_menu_item(vec![existing.clone()]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], existing);
        assert_eq!(items[1].url, "/admin/hello-plugin");
        assert_eq!(items[1].position, 999);
    }

    #[test]
    fn footer_keeps_existing_html() {
        let html = add_footer_message("<footer>".to_string());
        assert!(html.starts_with("<footer>"));
        assert!(html.contains("Hello Cimaise Plugin v1.0.0"));
    }

    #[tokio::test]
    async fn init_registers_all_hooks() {
        let db = cimaise_database::connect_in_memory().await.expect("db");
        let hooks = Arc::new(HookRegistry::new());
        let manifest = parse_manifest(SLUG, "Plugin Name: Hello Cimaise").expect("manifest");
        let ctx = PluginContext::new(manifest, hooks.clone(), db);

        HelloCimaisePlugin::new().init(&ctx).await.expect("init");

        assert_eq!(hooks.count_owned_by(SLUG), 5);
        let tabs = hooks.apply_filters(HookPoint::SettingsTabs, BTreeMap::<String, SettingsTab>::new(), &());
        assert_eq!(tabs["hello"].fields.len(), 3);
        let menu = hooks.apply_filters(HookPoint::AdminMenuItems, Vec::<MenuItem>::new(), &());
        assert_eq!(menu.len(), 1);
    }
}
