//! kplat-core: resilience primitives shared by the backend and frontend services
//!
//! - [`retry`]: retry policy, scheduler-agnostic retry state machine, async driver
//! - [`readiness`]: STARTING / READY / DEGRADED readiness gate
//! - [`metrics`]: Prometheus registry and per-request HTTP metrics
//! - [`telemetry`]: tracing subscriber setup
//! - [`http`]: router layers and graceful shutdown shared by both servers

pub mod error;
pub mod http;
pub mod metrics;
pub mod readiness;
pub mod retry;
pub mod telemetry;

pub use error::ConfigError;
pub use metrics::HttpMetrics;
pub use readiness::{ReadinessGate, ReadinessState};
pub use retry::{
    execute, AttemptContext, AttemptTimedOut, Idempotency, RetryError, RetryMachine, RetryPolicy,
    RetryState, Timer, TokioTimer, Transient,
};
