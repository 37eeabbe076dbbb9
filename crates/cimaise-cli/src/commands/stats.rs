//! Plugin statistics and hook diagnostics.

use serde::Serialize;
use tabled::Tabled;

use cimaise_core::error::AppError;

use crate::output::{self, OutputFormat};

pub async fn stats(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let kernel = super::open_kernel(config_path).await?;
    let scope = kernel.begin_request().await?;

    let stats = kernel.lifecycle().get_stats(scope.hooks()).await?;
    let fields = vec![
        ("Installed plugins", stats.total_plugins.to_string()),
        ("Active plugins", stats.active_count.to_string()),
        ("Registered callbacks", stats.total_hooks_registered.to_string()),
    ];
    output::print_item(&stats, &fields, format);

    scope.finish().await;
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    hook: String,
    actions: usize,
    filters: usize,
    plugins: String,
}

/// Loads the active plugins as a request would and lists what they hooked.
pub async fn hooks(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let kernel = super::open_kernel(config_path).await?;
    let scope = kernel.begin_request().await?;
    let report = scope.diagnostics().await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            let rows: Vec<HookRow> = report
                .hooks
                .iter()
                .map(|h| HookRow {
                    hook: h.hook.clone(),
                    actions: h.actions,
                    filters: h.filters,
                    plugins: h.owners.join(", "),
                })
                .collect();
            output::print_list(&rows, format);
            output::print_kv("Loaded plugins", &report.loaded_plugins.join(", "));
            output::print_kv("Total callbacks", &report.total_callbacks.to_string());
        }
    }

    scope.finish().await;
    Ok(())
}
