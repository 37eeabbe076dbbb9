//! Plugin lifecycle commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use cimaise_core::error::AppError;
use cimaise_entity::plugin::PluginState;
use cimaise_plugin::{LifecycleOutcome, PluginListing};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommand,
}

#[derive(Debug, Subcommand)]
pub enum PluginCommand {
    /// List every plugin bundle with its state
    List {
        /// Only show installed plugins
        #[arg(long)]
        installed: bool,
    },
    /// Show one plugin
    Info { slug: String },
    /// Install a plugin (runs its install script and activates it)
    Install { slug: String },
    /// Activate an installed plugin
    Activate { slug: String },
    /// Deactivate an installed plugin
    Deactivate { slug: String },
    /// Uninstall a plugin (runs its uninstall script and forgets it)
    Uninstall {
        slug: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    slug: String,
    name: String,
    version: String,
    state: String,
    installed_at: String,
}

impl From<&PluginListing> for PluginRow {
    fn from(listing: &PluginListing) -> Self {
        Self {
            slug: listing.manifest.slug.clone(),
            name: listing.manifest.name.clone(),
            version: listing.manifest.version.clone(),
            state: listing.state.to_string(),
            installed_at: listing
                .installed_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn execute(
    args: &PluginArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let kernel = super::open_kernel(config_path).await?;
    let lifecycle = kernel.lifecycle();

    match &args.command {
        PluginCommand::List { installed } => {
            let rows: Vec<PluginRow> = lifecycle
                .catalog()
                .await?
                .iter()
                .filter(|l| !installed || l.state.is_installed())
                .map(PluginRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        PluginCommand::Info { slug } => {
            let listing = lifecycle
                .catalog()
                .await?
                .into_iter()
                .find(|l| l.manifest.slug == *slug)
                .ok_or_else(|| AppError::not_found(format!("Plugin '{slug}' not found")))?;

            let fields = vec![
                ("Slug", listing.manifest.slug.clone()),
                ("Name", listing.manifest.name.clone()),
                ("Version", listing.manifest.version.clone()),
                ("Author", listing.manifest.author.clone()),
                ("License", listing.manifest.license.clone()),
                ("Description", listing.manifest.description.clone()),
                ("State", listing.state.to_string()),
                ("Install script", listing.has_install_script.to_string()),
                ("Uninstall script", listing.has_uninstall_script.to_string()),
            ];
            output::print_item(&listing, &fields, format);
        }
        PluginCommand::Install { slug } => report(lifecycle.install(slug).await?, format),
        PluginCommand::Activate { slug } => report(lifecycle.activate(slug).await?, format),
        PluginCommand::Deactivate { slug } => report(lifecycle.deactivate(slug).await?, format),
        PluginCommand::Uninstall { slug, force } => {
            if lifecycle.state(slug).await? == PluginState::Uninstalled {
                return Err(AppError::validation(format!("Plugin '{slug}' is not installed")));
            }

            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Uninstall '{slug}'? Its data will be removed. Continue?"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    output::print_warning("Cancelled.");
                    return Ok(());
                }
            }

            report(lifecycle.uninstall(slug).await?, format);
        }
    }

    kernel.db().close().await;
    Ok(())
}

fn report(outcome: LifecycleOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(&outcome),
        OutputFormat::Table if outcome.changed => {
            output::print_success(&format!("{}: {} ({})", outcome.slug, outcome.message, outcome.state))
        }
        OutputFormat::Table => output::print_warning(&format!("{}: {}", outcome.slug, outcome.message)),
    }
}
