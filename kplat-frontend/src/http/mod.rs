//! HTTP server layer

pub mod error;
pub mod routes;
pub mod server;

pub use error::ProxyError;
pub use server::{build_router, run_server, ServerError};
