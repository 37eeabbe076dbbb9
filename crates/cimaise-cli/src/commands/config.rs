//! Configuration commands.

use clap::{Args, Subcommand};

use cimaise_core::config::AppConfig;
use cimaise_core::error::AppError;
use cimaise_database::connection::mask_password;

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Check the configuration for errors
    Validate,
}

pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = AppConfig::load(config_path)?;
            config.database.url = mask_password(&config.database.url);
            output::print_item(&config, &summary(&config), format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                for (key, value) in summary(&config) {
                    output::print_kv(key, &value);
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

fn summary(config: &AppConfig) -> Vec<(&'static str, String)> {
    vec![
        ("Database", mask_password(&config.database.url)),
        ("Max connections", config.database.max_connections.to_string()),
        ("Plugin directory", config.plugins.directory.clone()),
        ("Entry file", config.plugins.entry_file.clone()),
        ("Auto load", config.plugins.auto_load.to_string()),
        ("Log level", config.logging.level.clone()),
        ("Log format", config.logging.format.clone()),
    ]
}
