//! Full request cycles with the shipped plugins loaded.

use std::collections::BTreeMap;

use serde_json::json;

use cimaise_database::repositories::SettingRepository;
use cimaise_plugin::HookPoint;
use cimaise_plugin::hooks::definitions::{AlbumCreated, DashboardWidget, MenuItem, SettingsTab};
use plugin_analytics_logger::EventStore;
use plugin_maintenance_mode::{settings, should_show_maintenance_page};

use crate::helpers::{BUNDLES, TestApp};

#[tokio::test]
async fn installed_plugins_contribute_to_the_page() {
    let app = TestApp::with_installed(&BUNDLES).await;
    let scope = app.kernel.begin_request().await.expect("request");

    assert_eq!(scope.loaded_slugs(), BUNDLES);

    let footer = scope.apply_filters(HookPoint::FooterContent, String::new(), &());
    assert!(footer.contains("Hello Cimaise"));

    let menu = scope.apply_filters(HookPoint::AdminMenuItems, Vec::<MenuItem>::new(), &());
    assert_eq!(menu.len(), 1);

    let tabs = scope.apply_filters(HookPoint::SettingsTabs, BTreeMap::<String, SettingsTab>::new(), &());
    assert!(tabs.contains_key("hello"));
    assert!(tabs.contains_key("maintenance"));

    let widgets =
        scope.apply_filters(HookPoint::AdminDashboardWidgets, Vec::<DashboardWidget>::new(), &());
    assert!(widgets.iter().any(|w| w.id == "analytics-logger-summary"));

    // maintenance mode ships disabled
    let robots = scope.apply_filters(HookPoint::RobotsMeta, "index,follow".to_string(), &());
    assert_eq!(robots, "index,follow");

    let report = scope.diagnostics().await.expect("diagnostics");
    assert_eq!(report.active_plugins, 3);
    assert_eq!(report.loaded_plugins.len(), 3);
    assert!(report.hooks.iter().any(|h| h.hook == "cimaise_init" && h.owners.len() == 2));

    scope.finish().await;
}

#[tokio::test]
async fn enabling_maintenance_applies_from_the_next_request() {
    let app = TestApp::with_installed(&["maintenance-mode"]).await;
    let first = app.kernel.begin_request().await.expect("request");

    SettingRepository::new(app.db().pool().clone())
        .set(settings::ENABLED, &json!(true))
        .await
        .expect("enable");

    let robots = first.apply_filters(HookPoint::RobotsMeta, "index,follow".to_string(), &());
    assert_eq!(robots, "index,follow");
    first.finish().await;

    let second = app.kernel.begin_request().await.expect("request");
    let robots = second.apply_filters(HookPoint::RobotsMeta, "index,follow".to_string(), &());
    assert_eq!(robots, "noindex,nofollow");
    let headers =
        second.apply_filters(HookPoint::ResponseHeaders, Vec::<(String, String)>::new(), &());
    assert!(headers.iter().any(|(name, _)| name == "X-Robots-Tag"));
    second.finish().await;

    let db = app.db();
    assert!(should_show_maintenance_page(db, false, "/albums", "").await.expect("gate"));
    assert!(!should_show_maintenance_page(db, true, "/albums", "").await.expect("gate"));
    assert!(!should_show_maintenance_page(db, false, "/admin/login", "").await.expect("gate"));
}

#[tokio::test]
async fn analytics_events_are_persisted_when_the_request_ends() {
    let app = TestApp::with_installed(&["analytics-logger"]).await;
    let store = EventStore::new(app.db().pool().clone());

    let scope = app.kernel.begin_request().await.expect("request");
    let album = AlbumCreated {
        album_id: 7,
        title: "Dolomites".to_string(),
        user_id: Some(1),
    };
    assert_eq!(scope.do_action(HookPoint::AlbumAfterCreate, &album), 1);
    assert_eq!(store.count().await.expect("count"), 0);
    scope.finish().await;

    assert_eq!(store.count().await.expect("count"), 1);

    let next = app.kernel.begin_request().await.expect("request");
    let widgets =
        next.apply_filters(HookPoint::AdminDashboardWidgets, Vec::<DashboardWidget>::new(), &());
    assert_eq!(widgets[0].data["events"][0]["event_type"], "album_created");
    assert_eq!(widgets[0].data["events"][0]["count"], 1);
    next.finish().await;
}

#[tokio::test]
async fn deactivated_plugin_no_longer_hooks_in() {
    let app = TestApp::with_installed(&["hello-cimaise"]).await;
    app.kernel.lifecycle().deactivate("hello-cimaise").await.expect("deactivate");

    let scope = app.kernel.begin_request().await.expect("request");
    assert!(scope.loaded().is_empty());
    assert_eq!(scope.apply_filters(HookPoint::FooterContent, String::new(), &()), "");

    let stats = app.kernel.lifecycle().get_stats(scope.hooks()).await.expect("stats");
    assert_eq!((stats.total_plugins, stats.active_count, stats.total_hooks_registered), (1, 0, 0));
    scope.finish().await;
}
