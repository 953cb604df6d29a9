//! `kplat backend`

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args;
use kplat_backend::db::migrations;
use kplat_backend::http::{run_server, ServerConfig};

use super::db::DbArgs;

#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BACKEND_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Run schema migrations before serving (requires the database to be up)
    #[arg(long)]
    pub migrate: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

pub async fn run(args: BackendArgs) -> Result<()> {
    let db = args.db.connect()?;

    if args.migrate {
        migrations::run(&db)
            .await
            .context("Startup migrations failed")?;
    }

    tracing::info!("Starting kplat backend on {}", args.bind);

    run_server(
        db,
        ServerConfig {
            bind_addr: args.bind,
        },
    )
    .await
    .context("Server error")?;

    Ok(())
}
