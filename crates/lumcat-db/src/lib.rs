//! The relational sink: pool setup, target-schema migrations, and execution
//! of generated migration scripts.

use std::time::Duration;

use lumcat_core::AppConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/lumcat-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Every table a migration script writes, in dependency order.
pub const TARGET_TABLES: [&str; 9] = [
    "categories",
    "finishes",
    "light_tones",
    "products",
    "product_variants",
    "variant_configurations",
    "product_finishes",
    "variant_light_tones",
    "variant_media",
];

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("migration script is empty")]
    EmptyScript,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending schema migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; treat that as zero.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Returns `true` when `script` holds at least one line that is neither blank
/// nor a `--` comment.
#[must_use]
pub fn has_statements(script: &str) -> bool {
    script.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("--")
    })
}

/// Execute a generated migration script in one round trip.
///
/// The script carries its own `BEGIN`/`COMMIT`, so a failing statement rolls
/// back everything before it. Returns the total rows affected.
///
/// # Errors
///
/// Returns [`DbError::EmptyScript`] for a script with no statements and
/// [`DbError::Sqlx`] if execution fails.
pub async fn apply_script(pool: &PgPool, script: &str) -> Result<u64, DbError> {
    if !has_statements(script) {
        return Err(DbError::EmptyScript);
    }

    let result = sqlx::raw_sql(script).execute(pool).await?;
    tracing::info!(
        rows_affected = result.rows_affected(),
        "migration script applied"
    );
    Ok(result.rows_affected())
}

/// Row count for every table in [`TARGET_TABLES`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any count query fails (for example when the
/// schema has not been migrated yet).
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>, DbError> {
    let mut counts = Vec::with_capacity(TARGET_TABLES.len());
    for table in TARGET_TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        counts.push((table, count));
    }
    Ok(counts)
}
