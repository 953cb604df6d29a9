//! Axum server setup
//!
//! Server skeleton with:
//! - Request ids, tracing and metrics from `kplat_core::http`
//! - Graceful shutdown on SIGTERM/Ctrl+C, then the pool is closed

use std::net::SocketAddr;

use axum::Router;
use kplat_core::http::{instrument, shutdown_signal};
use kplat_core::HttpMetrics;
use tokio::net::TcpListener;

use super::routes;
use crate::db::Database;
use crate::state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8000)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// Build the backend router over an existing pool.
pub fn build_router(state: AppState, metrics: HttpMetrics) -> Router {
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::items::router())
        .merge(routes::clubs::router());

    instrument(app, metrics).with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let db = Database::connect(&DatabaseConfig::default())?;
/// run_server(db, ServerConfig::default()).await?;
/// ```
pub async fn run_server(db: Database, config: ServerConfig) -> Result<(), ServerError> {
    let metrics = HttpMetrics::new("backend")?;
    let state = AppState::new(db.clone());
    let app = build_router(state, metrics);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Backend listening on {}", config.bind_addr);

    // Run with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
    }
}
