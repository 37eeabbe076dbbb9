mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{Counters, Script, defaults, fixture, write_bundle};

use cimaise_plugin::HookRegistry;

#[tokio::test]
async fn discover_lists_parseable_bundles_only() {
    let fx = fixture(&["beta", "alpha"], defaults).await;
    let root = fx.dir.path();

    std::fs::create_dir_all(root.join("nameless")).unwrap();
    std::fs::write(root.join("nameless/plugin.manifest"), " * Version: 1.0\n").unwrap();
    std::fs::create_dir_all(root.join("empty-dir")).unwrap();
    std::fs::write(root.join("stray-file.txt"), "not a bundle").unwrap();

    let slugs: Vec<String> = fx
        .kernel
        .loader()
        .discover()
        .into_iter()
        .map(|m| m.slug)
        .collect();
    assert_eq!(slugs, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn missing_plugin_directory_yields_empty_catalog() {
    let fx = fixture(&[], defaults).await;
    let loader = cimaise_plugin::PluginLoader::new(
        fx.dir.path().join("does-not-exist"),
        "plugin.manifest",
        Default::default(),
    );
    assert!(loader.discover().is_empty());
}

#[tokio::test]
async fn only_active_plugins_are_loaded() {
    let fx = fixture(&["on", "off", "never"], defaults).await;
    let lifecycle = fx.kernel.lifecycle();
    lifecycle.install("on").await.unwrap();
    lifecycle.install("off").await.unwrap();
    lifecycle.deactivate("off").await.unwrap();

    let hooks = Arc::new(HookRegistry::new());
    let loaded = fx
        .kernel
        .loader()
        .load_active(lifecycle, &hooks, &fx.db, &BTreeSet::new())
        .await
        .unwrap();

    let slugs: Vec<&str> = loaded.iter().map(|p| p.slug()).collect();
    assert_eq!(slugs, vec!["on"]);
    assert_eq!(hooks.count_owned_by("on"), 2);
    assert_eq!(hooks.count_owned_by("off"), 0);
    assert_eq!(hooks.count_owned_by("never"), 0);
}

#[tokio::test]
async fn already_loaded_plugins_are_not_initialised_twice() {
    let fx = fixture(&["once"], defaults).await;
    let lifecycle = fx.kernel.lifecycle();
    lifecycle.install("once").await.unwrap();

    let hooks = Arc::new(HookRegistry::new());
    let loader = fx.kernel.loader();
    let first = loader.load_active(lifecycle, &hooks, &fx.db, &BTreeSet::new()).await.unwrap();
    let seen: BTreeSet<String> = first.iter().map(|p| p.slug().to_string()).collect();
    let second = loader.load_active(lifecycle, &hooks, &fx.db, &seen).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(Counters::get(&fx.counters.inits), 1);
    assert_eq!(hooks.count_for("greeting"), 1);
}

#[tokio::test]
async fn failing_init_is_isolated_and_rolled_back() {
    let fx = fixture(&["a-good", "b-error", "c-panic", "d-good"], |slug, p| {
        p.init = match slug {
            "b-error" => Script::Error,
            "c-panic" => Script::Panic,
            _ => Script::Succeed,
        }
    })
    .await;
    let lifecycle = fx.kernel.lifecycle();
    for slug in ["a-good", "b-error", "c-panic", "d-good"] {
        lifecycle.install(slug).await.unwrap();
    }

    let hooks = Arc::new(HookRegistry::new());
    let loaded = fx
        .kernel
        .loader()
        .load_active(lifecycle, &hooks, &fx.db, &BTreeSet::new())
        .await
        .unwrap();

    let slugs: Vec<&str> = loaded.iter().map(|p| p.slug()).collect();
    assert_eq!(slugs, vec!["a-good", "d-good"]);
    assert_eq!(hooks.count_owned_by("b-error"), 0);
    assert_eq!(hooks.count_owned_by("c-panic"), 0);
    assert_eq!(
        hooks.apply_filters("greeting", String::from("hi"), &()),
        "hi[a-good][d-good]"
    );
}

#[tokio::test]
async fn active_plugin_without_bundle_is_skipped() {
    let fx = fixture(&["kept", "removed"], defaults).await;
    let lifecycle = fx.kernel.lifecycle();
    lifecycle.install("kept").await.unwrap();
    lifecycle.install("removed").await.unwrap();
    std::fs::remove_dir_all(fx.dir.path().join("removed")).unwrap();

    let hooks = Arc::new(HookRegistry::new());
    let loaded = fx
        .kernel
        .loader()
        .load_active(lifecycle, &hooks, &fx.db, &BTreeSet::new())
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].slug(), "kept");
}

#[tokio::test]
async fn active_plugin_without_implementation_is_skipped() {
    let fx = fixture(&["real"], defaults).await;
    let lifecycle = fx.kernel.lifecycle();
    lifecycle.install("real").await.unwrap();

    // A bundle that was installed under a build which still shipped its code.
    write_bundle(fx.dir.path(), "ghost", "Ghost");
    sqlx::query(
        "INSERT INTO plugins (slug, name, is_active, updated_at) VALUES ('ghost', 'Ghost', 1, '2024-01-01T00:00:00Z')",
    )
    .execute(fx.db.pool())
    .await
    .unwrap();

    let hooks = Arc::new(HookRegistry::new());
    let loaded = fx
        .kernel
        .loader()
        .load_active(lifecycle, &hooks, &fx.db, &BTreeSet::new())
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].slug(), "real");
}
