//! Axum server setup
//!
//! Same layer stack as the backend; no database, so nothing to close on exit.

use axum::Router;
use kplat_core::http::{instrument, shutdown_signal};
use kplat_core::HttpMetrics;
use tokio::net::TcpListener;

use super::routes;
use crate::client::{BackendClient, ClientError};
use crate::config::FrontendConfig;
use crate::state::AppState;

/// Build the frontend router.
pub fn build_router(state: AppState, metrics: HttpMetrics) -> Router {
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::proxy::router());

    instrument(app, metrics).with_state(state)
}

/// Run the proxy until a shutdown signal arrives.
pub async fn run_server(config: FrontendConfig) -> Result<(), ServerError> {
    let metrics = HttpMetrics::new("frontend")?;
    let backend = BackendClient::new(&config, &metrics)?;
    let state = AppState::new(backend, config.ready_probe_timeout);
    let app = build_router(state, metrics);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        backend = %config.base_url(),
        max_attempts = config.retry.max_attempts,
        deadline_ms = config.retry.total_deadline.as_millis() as u64,
        "Frontend listening on {}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}
