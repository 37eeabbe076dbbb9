//! Lifecycle transitions against the shipped plugins.

use serde_json::json;

use cimaise_database::repositories::SettingRepository;
use cimaise_entity::plugin::PluginState;
use plugin_analytics_logger::EventStore;
use plugin_maintenance_mode::settings;

use crate::helpers::{BUNDLES, TestApp};

#[tokio::test]
async fn every_shipped_bundle_is_discovered() {
    let app = TestApp::new().await;

    let catalog = app.kernel.lifecycle().catalog().await.expect("catalog");
    let slugs: Vec<&str> = catalog.iter().map(|l| l.manifest.slug.as_str()).collect();
    assert_eq!(slugs, BUNDLES);

    for listing in &catalog {
        assert_eq!(listing.state, PluginState::Uninstalled);
        assert_eq!(listing.manifest.version, "1.0.0");
        assert_eq!(listing.manifest.author, "Cimaise Team");
    }

    let hello = catalog.iter().find(|l| l.manifest.slug == "hello-cimaise").expect("hello");
    assert!(!hello.has_install_script);
    let maintenance = catalog.iter().find(|l| l.manifest.slug == "maintenance-mode").expect("maintenance");
    assert!(maintenance.has_install_script && maintenance.has_uninstall_script);
}

#[tokio::test]
async fn installing_seeds_settings_once() {
    let app = TestApp::with_installed(&["maintenance-mode"]).await;
    let repo = SettingRepository::new(app.db().pool().clone());
    repo.set(settings::MESSAGE, &json!("Back at noon")).await.expect("set");

    let again = app.kernel.lifecycle().install("maintenance-mode").await.expect("reinstall");
    assert!(!again.changed);
    assert_eq!(repo.get(settings::MESSAGE).await.expect("get"), Some(json!("Back at noon")));
}

#[tokio::test]
async fn uninstall_removes_plugin_data() {
    let app = TestApp::with_installed(&["analytics-logger", "maintenance-mode"]).await;
    let lifecycle = app.kernel.lifecycle();
    let store = EventStore::new(app.db().pool().clone());
    assert!(store.table_exists().await.expect("exists"));

    lifecycle.uninstall("analytics-logger").await.expect("uninstall analytics");
    lifecycle.uninstall("maintenance-mode").await.expect("uninstall maintenance");

    assert!(!store.table_exists().await.expect("exists"));
    let repo = SettingRepository::new(app.db().pool().clone());
    for key in settings::KEYS {
        assert!(repo.get(key).await.expect("get").is_none(), "{key} left behind");
    }

    let stats = lifecycle.get_stats(&Default::default()).await.expect("stats");
    assert_eq!(stats.total_plugins, 0);
    assert_eq!(lifecycle.catalog().await.expect("catalog").len(), BUNDLES.len());
}

#[tokio::test]
async fn reinstall_after_uninstall_starts_clean() {
    let app = TestApp::with_installed(&["analytics-logger"]).await;
    let lifecycle = app.kernel.lifecycle();

    lifecycle.deactivate("analytics-logger").await.expect("deactivate");
    lifecycle.uninstall("analytics-logger").await.expect("uninstall");
    let outcome = lifecycle.install("analytics-logger").await.expect("install");

    assert!(outcome.changed);
    assert_eq!(outcome.state, PluginState::Active);
    let store = EventStore::new(app.db().pool().clone());
    assert_eq!(store.count().await.expect("count"), 0);
}
