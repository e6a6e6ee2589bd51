mod db;
mod generate;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::generate::GenerateArgs;

#[derive(Debug, Parser)]
#[command(name = "lumcat")]
#[command(about = "Turn the legacy lighting-catalog export into normalized SQL")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a migration script from a legacy export file
    Generate(GenerateArgs),
    /// Target database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = lumcat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout may carry the generated script; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Generate(args)) => generate::run_generate(&config, &args)?,
        Some(Commands::Db { command }) => db::run_db(&config, command).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
