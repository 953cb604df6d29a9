//! Database connection arguments and the `migrate` / `seed` commands

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use kplat_backend::db::{migrations, seed};
use kplat_backend::{Database, DatabaseConfig};

/// Postgres connection and pool settings
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Full connection string; overrides the individual DB_* settings
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "postgres")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "postgres", hide_env_values = true)]
    pub db_password: String,

    /// Connections kept open while idle
    #[arg(long, env = "DB_MIN_CONN", default_value_t = 2)]
    pub db_min_conn: u32,

    /// Upper bound on concurrently checked-out connections
    #[arg(long, env = "DB_MAX_CONN", default_value_t = 10)]
    pub db_max_conn: u32,

    /// Longest a request waits for a free connection, in milliseconds
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_MS", default_value_t = 3000)]
    pub db_acquire_timeout_ms: u64,

    /// Budget of the readiness probe, in milliseconds
    #[arg(long, env = "DB_PROBE_TIMEOUT_MS", default_value_t = 1000)]
    pub db_probe_timeout_ms: u64,
}

impl DbArgs {
    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            min_connections: self.db_min_conn,
            max_connections: self.db_max_conn,
            acquire_timeout: Duration::from_millis(self.db_acquire_timeout_ms),
            probe_timeout: Duration::from_millis(self.db_probe_timeout_ms),
        }
    }

    pub fn connect(&self) -> Result<Database> {
        Database::connect(&self.config()).context("Invalid database configuration")
    }
}

pub async fn run_migrate(args: DbArgs) -> Result<()> {
    let db = args.connect()?;
    migrations::run(&db).await.context("Migrations failed")?;
    db.close().await;
    Ok(())
}

pub async fn run_seed(args: DbArgs) -> Result<()> {
    let db = args.connect()?;
    migrations::run(&db).await.context("Migrations failed")?;
    let report = seed::run(&db).await.context("Seeding failed")?;
    println!(
        "Seeded {} item(s) and {} club(s)",
        report.items, report.clubs
    );
    db.close().await;
    Ok(())
}
