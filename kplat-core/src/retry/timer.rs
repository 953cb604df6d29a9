use std::time::{Duration, Instant};

use futures::future::BoxFuture;

/// Clock and sleep source used to drive a [`RetryMachine`](super::RetryMachine).
pub trait Timer: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// [`Timer`] backed by the tokio time driver.
///
/// `now` goes through `tokio::time::Instant`, so paused test time is honored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
