//! farmsync CLI - Offline-first farm records from the terminal
//!
//! Reads and edits farm types, crops, farmers, and users through the shared
//! synchronizers, falling back to the local mirror when offline.

mod cli;
mod commands;
mod error;
mod settings;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth::{run_login, run_logout, run_refresh, run_whoami};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::resources::{run_crops, run_farm_types, run_farmers, run_users};
use crate::commands::status::run_status;
use crate::error::CliError;
use crate::settings::Overrides;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("farmsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        api_base_url: cli.api_url,
        db_path: cli.db_path,
        offline: cli.offline,
    };

    match cli.command {
        Commands::Login { username, password } => {
            run_login(&username, password, &overrides).await
        }
        Commands::Refresh => run_refresh(&overrides).await,
        Commands::Logout => run_logout(&overrides).await,
        Commands::Whoami => run_whoami(&overrides).await,
        Commands::Status { json } => run_status(json, &overrides).await,
        Commands::FarmTypes { command } => run_farm_types(command, &overrides).await,
        Commands::Crops { command } => run_crops(command, &overrides).await,
        Commands::Farmers { command } => run_farmers(command, &overrides).await,
        Commands::Users { command } => run_users(command, &overrides).await,
        Commands::Config { command } => run_config(command, &overrides),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
