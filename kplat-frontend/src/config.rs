//! Frontend configuration

use std::net::SocketAddr;
use std::time::Duration;

use kplat_core::{ConfigError, RetryPolicy};

/// Everything the proxy needs to reach the backend
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Base URL of the backend service, without a trailing slash
    pub backend_base_url: String,
    pub retry: RetryPolicy,
    /// Budget of the single backend probe behind `/ready`
    pub ready_probe_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://backend:8000".to_string(),
            retry: RetryPolicy::default(),
            ready_probe_timeout: Duration::from_secs(2),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
        }
    }
}

impl FrontendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing {
                field: "BACKEND_BASE_URL",
            });
        }
        match reqwest::Url::parse(url) {
            Ok(parsed)
                if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {}
            _ => {
                return Err(ConfigError::malformed(
                    "BACKEND_BASE_URL",
                    url,
                    "expected an absolute http(s) URL with a host",
                ));
            }
        }
        if self.ready_probe_timeout.is_zero() {
            return Err(ConfigError::out_of_range(
                "READY_PROBE_TIMEOUT_MS",
                "must be greater than zero",
            ));
        }
        self.retry.validate()
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.backend_base_url.trim().trim_end_matches('/')
    }
}
