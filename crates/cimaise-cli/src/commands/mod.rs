//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod plugin;
pub mod stats;

use clap::{Parser, Subcommand};

use cimaise_core::config::AppConfig;
use cimaise_core::error::AppError;
use cimaise_plugin::PluginKernel;

use crate::output::OutputFormat;

/// Cimaise plugin administration
#[derive(Debug, Parser)]
#[command(name = "cimaise", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install, activate and inspect plugins
    Plugin(plugin::PluginArgs),
    /// Plugin and hook counts
    Stats,
    /// Hooks registered by the active plugins
    Hooks,
    /// Database migrations
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Plugin(args) => plugin::execute(args, &self.config, self.format).await,
            Commands::Stats => stats::stats(&self.config, self.format).await,
            Commands::Hooks => stats::hooks(&self.config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(config_path)?;
    config.validate()?;
    Ok(config)
}

pub async fn open_kernel(config_path: &str) -> Result<PluginKernel, AppError> {
    let config = load_config(config_path)?;
    cimaise::start(&config).await
}
