//! `kplat frontend`

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use kplat_core::RetryPolicy;
use kplat_frontend::{run_server, FrontendConfig};

#[derive(Args, Debug)]
pub struct FrontendArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "FRONTEND_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Base URL of the backend service
    #[arg(long, env = "BACKEND_BASE_URL", default_value = "http://backend:8000")]
    pub backend_base_url: String,

    /// Attempts per backend call, including the first
    #[arg(long, env = "RETRY_MAX_ATTEMPTS", default_value_t = 4)]
    pub retry_max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value_t = 1000)]
    pub retry_base_delay_ms: u64,

    /// Growth factor between consecutive retry delays
    #[arg(long, env = "RETRY_MULTIPLIER", default_value_t = 2.0)]
    pub retry_multiplier: f64,

    /// Upper bound of the random jitter added to each delay, in milliseconds
    #[arg(long, env = "RETRY_MAX_JITTER_MS", default_value_t = 250)]
    pub retry_max_jitter_ms: u64,

    /// Timeout of a single backend attempt, in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// Bound on a whole backend call including retries, in milliseconds
    #[arg(long, env = "REQUEST_DEADLINE_MS", default_value_t = 15000)]
    pub request_deadline_ms: u64,

    /// Timeout of the backend probe behind /ready, in milliseconds
    #[arg(long, env = "READY_PROBE_TIMEOUT_MS", default_value_t = 2000)]
    pub ready_probe_timeout_ms: u64,
}

impl FrontendArgs {
    pub fn config(&self) -> FrontendConfig {
        FrontendConfig {
            backend_base_url: self.backend_base_url.clone(),
            retry: RetryPolicy {
                max_attempts: self.retry_max_attempts,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
                multiplier: self.retry_multiplier,
                max_jitter: Duration::from_millis(self.retry_max_jitter_ms),
                attempt_timeout: Duration::from_millis(self.request_timeout_ms),
                total_deadline: Duration::from_millis(self.request_deadline_ms),
            },
            ready_probe_timeout: Duration::from_millis(self.ready_probe_timeout_ms),
            bind_addr: self.bind,
        }
    }
}

pub async fn run(args: FrontendArgs) -> Result<()> {
    let config = args.config();
    config.validate().context("Invalid frontend configuration")?;

    tracing::info!(
        "Starting kplat frontend on {} (backend: {})",
        config.bind_addr,
        config.base_url()
    );

    run_server(config).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        frontend: FrontendArgs,
    }

    #[test]
    fn defaults_match_retry_policy_defaults() {
        let harness = Harness::parse_from(["kplat"]);
        let config = harness.frontend.config();
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.ready_probe_timeout, Duration::from_secs(2));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let harness = Harness::parse_from(["kplat", "--retry-max-attempts", "0"]);
        assert!(harness.frontend.config().validate().is_err());
    }
}
