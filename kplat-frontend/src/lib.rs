//! kplat-frontend: proxy in front of the backend service
//!
//! Calls to the backend are bounded per attempt and by a total deadline, and
//! transient failures are retried with jittered exponential backoff. Failures
//! reach the caller as 502 or 504, never as partial data.

pub mod client;
pub mod config;
pub mod http;
pub mod state;
pub mod upstream;

pub use client::{BackendClient, ClientError};
pub use config::FrontendConfig;
pub use http::{build_router, run_server};
pub use state::AppState;
pub use upstream::UpstreamError;
