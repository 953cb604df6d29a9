//! kplat-backend: pooled Postgres access behind CRUD and readiness endpoints
//!
//! The database layer classifies failures but never retries; the HTTP layer
//! maps each class to a status code.

pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use db::{Database, DatabaseConfig, DbError};
pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;
