//! Shared fixtures: throwaway plugin directories and scripted plugins.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use cimaise_core::config::PluginConfig;
use cimaise_core::error::AppError;
use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;
use cimaise_plugin::hooks::definitions::InitArgs;
use cimaise_plugin::{Plugin, PluginContext, PluginFactoryRegistry, PluginKernel, ScriptOutcome};

/// Write `plugins/<slug>/plugin.manifest` with the given display name.
pub fn write_bundle(root: &Path, slug: &str, name: &str) {
    let dir = root.join(slug);
    std::fs::create_dir_all(&dir).expect("create bundle dir");
    std::fs::write(
        dir.join("plugin.manifest"),
        format!("/**\n * Plugin Name: {name}\n * Version: 1.0.0\n * Author: Tests\n * License: MIT\n */\n"),
    )
    .expect("write manifest");
}

pub fn config_for(root: &Path) -> PluginConfig {
    PluginConfig {
        directory: root.display().to_string(),
        entry_file: "plugin.manifest".to_string(),
        auto_load: true,
    }
}

/// How a [`ScriptedPlugin`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Succeed,
    Fail,
    Error,
    Panic,
}

/// Counts script invocations across instances.
#[derive(Debug, Default)]
pub struct Counters {
    pub installs: AtomicUsize,
    pub uninstalls: AtomicUsize,
    pub inits: AtomicUsize,
    pub finishes: AtomicUsize,
    pub init_seen: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Plugin that registers one filter on `greeting` and one action on
/// `cimaise_init`, with configurable failure modes.
pub struct ScriptedPlugin {
    pub tag: &'static str,
    pub priority: i32,
    pub init: Script,
    pub install: Script,
    pub uninstall: Script,
    pub counters: Arc<Counters>,
}

impl ScriptedPlugin {
    pub fn new(tag: &'static str, counters: Arc<Counters>) -> Self {
        Self {
            tag,
            priority: 10,
            init: Script::Succeed,
            install: Script::Succeed,
            uninstall: Script::Succeed,
            counters,
        }
    }
}

fn outcome(script: Script, what: &str) -> AppResult<ScriptOutcome> {
    match script {
        Script::Succeed => Ok(ScriptOutcome::ok(format!("{what} ok"))),
        Script::Fail => Ok(ScriptOutcome::failed(format!("{what} refused"))),
        Script::Error => Err(AppError::database(format!("{what} exploded"))),
        Script::Panic => panic!("{what} panicked"),
    }
}

#[async_trait]
impl Plugin for ScriptedPlugin {
    async fn init(&self, ctx: &PluginContext) -> AppResult<()> {
        self.counters.inits.fetch_add(1, Ordering::SeqCst);

        let tag = self.tag;
        ctx.add_filter_at("greeting", self.priority, move |s: String, _: &()| {
            Ok(format!("{s}[{tag}]"))
        });
        let counters = self.counters.clone();
        ctx.add_action(cimaise_plugin::HookPoint::CimaiseInit, move |_: &InitArgs| {
            counters.init_seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        match self.init {
            Script::Succeed => Ok(()),
            Script::Fail | Script::Error => Err(AppError::plugin("init refused")),
            Script::Panic => panic!("init panicked"),
        }
    }

    fn has_install_script(&self) -> bool {
        true
    }

    async fn install(&self, _db: &DatabasePool) -> AppResult<ScriptOutcome> {
        self.counters.installs.fetch_add(1, Ordering::SeqCst);
        outcome(self.install, "install")
    }

    fn has_uninstall_script(&self) -> bool {
        true
    }

    async fn uninstall(&self, _db: &DatabasePool) -> AppResult<ScriptOutcome> {
        self.counters.uninstalls.fetch_add(1, Ordering::SeqCst);
        outcome(self.uninstall, "uninstall")
    }

    async fn finish(&self, _db: &DatabasePool) -> AppResult<()> {
        self.counters.finishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A kernel over a temp plugin directory and an in-memory database.
pub struct Fixture {
    pub dir: TempDir,
    pub db: DatabasePool,
    pub kernel: PluginKernel,
    pub counters: Arc<Counters>,
}

/// Build a fixture; `configure` adjusts each plugin's behaviour by slug.
pub async fn fixture<F>(slugs: &[&'static str], configure: F) -> Fixture
where
    F: Fn(&'static str, &mut ScriptedPlugin) + Send + Sync + Clone + 'static,
{
    let dir = tempfile::tempdir().expect("tempdir");
    let db = cimaise_database::connect_in_memory().await.expect("db");
    let counters = Arc::new(Counters::default());

    let mut factories = PluginFactoryRegistry::new();
    for &slug in slugs {
        write_bundle(dir.path(), slug, &format!("Plugin {slug}"));
        let counters = counters.clone();
        let configure = configure.clone();
        factories.register(slug, move || {
            let mut plugin = ScriptedPlugin::new(slug, counters.clone());
            configure(slug, &mut plugin);
            Arc::new(plugin) as Arc<dyn Plugin>
        });
    }

    let kernel = PluginKernel::new(db.clone(), config_for(dir.path()), factories);
    Fixture {
        dir,
        db,
        kernel,
        counters,
    }
}

pub fn defaults(_: &'static str, _: &mut ScriptedPlugin) {}
