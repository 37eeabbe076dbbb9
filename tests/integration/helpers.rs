//! Shared test helpers for integration tests.

use std::path::Path;

use tempfile::TempDir;

use cimaise_core::config::PluginConfig;
use cimaise_database::DatabasePool;
use cimaise_plugin::PluginKernel;

pub const BUNDLES: [&str; 3] = ["analytics-logger", "hello-cimaise", "maintenance-mode"];

/// Kernel over an in-memory database and a copy of the shipped bundles.
pub struct TestApp {
    pub dir: TempDir,
    pub kernel: PluginKernel,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create plugin dir");
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("plugins");

        for slug in BUNDLES {
            let target = dir.path().join(slug);
            std::fs::create_dir_all(&target).expect("Failed to create bundle dir");
            std::fs::copy(
                shipped.join(slug).join("plugin.manifest"),
                target.join("plugin.manifest"),
            )
            .expect("Failed to copy manifest");
        }

        let db = cimaise_database::connect_in_memory()
            .await
            .expect("Failed to open test database");

        let config = PluginConfig {
            directory: dir.path().display().to_string(),
            entry_file: "plugin.manifest".to_string(),
            auto_load: true,
        };

        let kernel = PluginKernel::new(db, config, cimaise::builtin_factories());
        Self { dir, kernel }
    }

    /// Fresh app with the given plugins installed (and therefore active).
    pub async fn with_installed(slugs: &[&str]) -> Self {
        let app = Self::new().await;
        for slug in slugs {
            app.kernel
                .lifecycle()
                .install(slug)
                .await
                .expect("Failed to install plugin");
        }
        app
    }

    pub fn db(&self) -> &DatabasePool {
        self.kernel.db()
    }
}
