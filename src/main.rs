//! Cimaise plugin host.
//!
//! Boots the plugin kernel, serves one request cycle against the configured
//! database and reports what the active plugins contributed.

use std::collections::BTreeMap;

use cimaise_core::config::AppConfig;
use cimaise_core::error::AppError;
use cimaise_plugin::{HookPoint, PluginKernel};
use cimaise_plugin::hooks::definitions::{DashboardWidget, MenuItem, SettingsTab};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    cimaise::init_logging(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Cimaise exited with an error");
        std::process::exit(1);
    }
}

fn load_configuration() -> Result<AppConfig, AppError> {
    let path =
        std::env::var("CIMAISE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let config = AppConfig::load(&path)?;
    config.validate()?;
    Ok(config)
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Cimaise");

    let kernel = cimaise::start(&config).await?;
    let catalog = kernel.loader().discover();
    tracing::info!(
        directory = %kernel.loader().directory().display(),
        bundles = catalog.len(),
        "Plugin bundles discovered"
    );

    render_page(&kernel).await?;

    kernel.db().close().await;
    tracing::info!("Cimaise stopped");
    Ok(())
}

/// One request: load plugins, run the page hooks, flush.
async fn render_page(kernel: &PluginKernel) -> Result<(), AppError> {
    let scope = kernel.begin_request().await?;

    let menu = scope.apply_filters(HookPoint::AdminMenuItems, Vec::<MenuItem>::new(), &());
    let widgets =
        scope.apply_filters(HookPoint::AdminDashboardWidgets, Vec::<DashboardWidget>::new(), &());
    let tabs = scope.apply_filters(
        HookPoint::SettingsTabs,
        BTreeMap::<String, SettingsTab>::new(),
        &(),
    );
    let footer = scope.apply_filters(HookPoint::FooterContent, String::new(), &());
    let robots = scope.apply_filters(HookPoint::RobotsMeta, "index,follow".to_string(), &());
    let headers =
        scope.apply_filters(HookPoint::ResponseHeaders, Vec::<(String, String)>::new(), &());

    tracing::info!(
        menu_items = menu.len(),
        widgets = widgets.len(),
        settings_tabs = tabs.len(),
        footer_bytes = footer.len(),
        robots = %robots,
        headers = headers.len(),
        "Page hooks applied"
    );

    let report = scope.diagnostics().await?;
    tracing::info!(report = %serde_json::to_string(&report)?, "Plugin diagnostics");

    scope.finish().await;
    Ok(())
}
