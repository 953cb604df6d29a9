//! Readiness gating
//!
//! Distinguishes "process alive" (liveness, always true while serving) from
//! "process can serve traffic" (readiness, driven by a dependency probe).
//!
//! ```text
//! STARTING --probe ok--> READY --probe fails--> DEGRADED --probe ok--> READY
//! STARTING --probe fails--> STARTING
//! ```
//!
//! The state is recomputed from the probe on every readiness request; only
//! the STARTING/DEGRADED distinction carries over between probes.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Readiness as reported to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    /// No probe has succeeded yet
    Starting,
    Ready,
    /// A probe failed after the service had been ready
    Degraded,
}

impl ReadinessState {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    /// Next state after a probe result
    pub fn next(self, probe_ok: bool) -> Self {
        match (self, probe_ok) {
            (_, true) => Self::Ready,
            (Self::Starting, false) => Self::Starting,
            (Self::Ready | Self::Degraded, false) => Self::Degraded,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Ready,
            2 => Self::Degraded,
            _ => Self::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Ready => 1,
            Self::Degraded => 2,
        }
    }
}

/// Shared readiness state of one service instance
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    state: Arc<AtomicU8>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReadinessState {
        ReadinessState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Apply a probe result and return the new state.
    pub fn observe(&self, probe_ok: bool) -> ReadinessState {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let next = ReadinessState::from_u8(current).next(probe_ok);
            match self.state.compare_exchange_weak(
                current,
                next.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let previous = ReadinessState::from_u8(current);
                    if previous != next {
                        tracing::info!(?previous, ?next, "readiness changed");
                    }
                    return next;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Run `probe` and fold its outcome into the gate.
    pub async fn check<T, E, Fut>(&self, probe: Fut) -> (ReadinessState, Result<T, E>)
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let result = probe.await;
        let state = self.observe(result.is_ok());
        (state, result)
    }
}
