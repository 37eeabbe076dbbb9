//! Application wiring shared by the `cimaise` binaries: built-in plugins,
//! logging and database startup.

use tracing_subscriber::{EnvFilter, fmt};

use cimaise_core::config::{AppConfig, LoggingConfig};
use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;
use cimaise_database::migration::run_migrations;
use cimaise_plugin::{PluginFactoryRegistry, PluginKernel};

/// Plugin implementations compiled into the application.
pub fn builtin_factories() -> PluginFactoryRegistry {
    PluginFactoryRegistry::new()
        .with(plugin_hello_cimaise::SLUG, plugin_hello_cimaise::HelloCimaisePlugin::factory)
        .with(
            plugin_maintenance_mode::SLUG,
            plugin_maintenance_mode::MaintenanceModePlugin::factory,
        )
        .with(
            plugin_analytics_logger::SLUG,
            plugin_analytics_logger::AnalyticsLoggerPlugin::factory,
        )
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => fmt().json().with_env_filter(filter).with_target(true).init(),
        _ => fmt().pretty().with_env_filter(filter).with_target(true).init(),
    }
}

/// Connect, migrate and build the plugin kernel.
pub async fn start(config: &AppConfig) -> AppResult<PluginKernel> {
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    Ok(PluginKernel::new(db, config.plugins.clone(), builtin_factories()))
}
