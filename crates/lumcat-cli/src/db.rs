//! `lumcat db`: operations against the target database.

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use lumcat_core::AppConfig;
use lumcat_db::PoolConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Create or update the target schema
    Migrate,
    /// Execute a generated migration script
    Apply {
        /// Script produced by `lumcat generate`
        #[arg(long)]
        script: PathBuf,
    },
    /// Print row counts for every target table
    Counts,
}

pub(crate) async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let database_url = config.require_database_url()?;
    let pool = lumcat_db::connect_pool(database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to database")?;

    match command {
        DbCommands::Ping => {
            lumcat_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = lumcat_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Apply { script } => {
            let sql = std::fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let rows = lumcat_db::apply_script(&pool, &sql)
                .await
                .with_context(|| format!("failed to apply {}", script.display()))?;
            println!("applied {} ({rows} rows affected)", script.display());
        }
        DbCommands::Counts => {
            for (table, count) in lumcat_db::table_counts(&pool).await? {
                println!("{table:<24} {count}");
            }
        }
    }

    Ok(())
}
