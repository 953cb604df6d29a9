//! kplat CLI - the three-tier demo's services in one binary
//!
//! - `backend`: pooled Postgres access behind CRUD and readiness endpoints
//! - `frontend`: proxy that retries transient backend failures under a deadline
//! - `migrate` / `seed`: schema and demo data
//!
//! Every option also reads an environment variable; a `.env` file in the
//! working directory is loaded first.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use kplat_core::telemetry::{self, LogFormat, TracingConfig};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "kplat",
    author,
    version,
    about = "Resilient three-tier demo: frontend proxy, backend service, Postgres",
    long_about = "Run the kplat frontend proxy or backend service, or manage the backend's \
                  schema. Configuration comes from flags or the equivalent environment variables."
)]
struct Cli {
    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Log output format: compact or json
    #[arg(long, global = true, env = "LOG_FORMAT", default_value = "compact")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the backend service (Postgres-backed API)
    Backend(commands::backend::BackendArgs),
    /// Run the frontend proxy service
    Frontend(commands::frontend::FrontendArgs),
    /// Create tables and triggers if missing
    Migrate(commands::db::DbArgs),
    /// Insert the demo items and clubs (runs migrations first)
    Seed(commands::db::DbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    telemetry::init(&TracingConfig {
        debug: cli.debug,
        format: cli.log_format,
    })
    .map_err(|err| anyhow!(err))?;

    match cli.command {
        Commands::Backend(args) => commands::backend::run(args).await?,
        Commands::Frontend(args) => commands::frontend::run(args).await?,
        Commands::Migrate(args) => commands::db::run_migrate(args).await?,
        Commands::Seed(args) => commands::db::run_seed(args).await?,
    }
    Ok(())
}
