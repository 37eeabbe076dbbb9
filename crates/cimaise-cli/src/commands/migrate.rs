//! Database migration commands.

use clap::{Args, Subcommand};

use cimaise_core::error::AppError;
use cimaise_database::DatabasePool;
use cimaise_database::connection::mask_password;
use cimaise_database::migration::run_migrations;

use crate::output;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply pending migrations
    Run,
}

pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Migrating {} ...", mask_password(&config.database.url));
            let db = DatabasePool::connect(&config.database).await?;
            run_migrations(db.pool()).await?;
            db.close().await;
            output::print_success("All migrations applied.");
        }
    }

    Ok(())
}
