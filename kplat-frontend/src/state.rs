//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use kplat_core::ReadinessGate;

use crate::client::BackendClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    backend: BackendClient,
    readiness: ReadinessGate,
    ready_probe_timeout: Duration,
}

impl AppState {
    pub fn new(backend: BackendClient, ready_probe_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                backend,
                readiness: ReadinessGate::new(),
                ready_probe_timeout,
            }),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.inner.readiness
    }

    pub fn ready_probe_timeout(&self) -> Duration {
        self.inner.ready_probe_timeout
    }
}
