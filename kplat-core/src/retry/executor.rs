//! Async driver for [`RetryMachine`]

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{select, Either};
use thiserror::Error;

use super::error::RetryError;
use super::machine::{RetryMachine, RetryState};
use super::policy::{Idempotency, RetryPolicy};
use super::timer::Timer;

/// Classifies an error as worth retrying.
///
/// Anything an implementation cannot positively identify as transient must
/// return `false`.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// A single attempt ran past its timeout
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("attempt timed out after {after:?}")]
pub struct AttemptTimedOut {
    pub after: Duration,
}

/// Passed to the operation for each attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptContext {
    /// 1-based attempt number
    pub attempt: u32,
    /// Time budget of this attempt; the driver enforces it as well
    pub timeout: Duration,
}

/// Run `op` under `policy`, retrying transient failures.
///
/// Each attempt is raced against its timeout on `timer`; a lost race becomes
/// `E::from(AttemptTimedOut)`, which the error type decides how to classify.
/// Dropping the returned future cancels the in-flight attempt and any pending
/// backoff.
pub async fn execute<T, E, F, Fut, Tm>(
    policy: &RetryPolicy,
    idempotency: Idempotency,
    timer: &Tm,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    Tm: Timer + ?Sized,
    F: FnMut(AttemptContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + From<AttemptTimedOut> + std::fmt::Display,
{
    let mut machine = RetryMachine::new(policy, idempotency, timer.now());
    let mut last_error: Option<E> = None;

    loop {
        match machine.state() {
            RetryState::Attempting { .. } => {
                let Some((attempt, timeout)) = machine.begin_attempt(timer.now()) else {
                    continue;
                };

                match run_attempt(timer, timeout, op(AttemptContext { attempt, timeout })).await {
                    Ok(value) => {
                        machine.record_success();
                        if attempt > 1 {
                            tracing::info!(attempt, "call succeeded after retry");
                        }
                        return Ok(value);
                    }
                    Err(err) => {
                        let transient = err.is_transient();
                        machine.record_failure(transient, timer.now(), policy.sample_jitter());
                        tracing::warn!(attempt, transient, error = %err, "attempt failed");
                        last_error = Some(err);
                    }
                }
            }
            RetryState::Waiting { attempt, delay } => {
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                timer.sleep(delay).await;
                machine.finish_wait();
            }
            RetryState::Failed { attempts, reason } => {
                tracing::warn!(attempts, ?reason, "giving up");
                return Err(RetryError::from_failure(
                    reason,
                    attempts,
                    policy.total_deadline,
                    last_error,
                ));
            }
            // Success returns from the attempt arm.
            RetryState::Succeeded { .. } => unreachable!("succeeded state observed in driver loop"),
        }
    }
}

async fn run_attempt<T, E, Fut, Tm>(timer: &Tm, timeout: Duration, fut: Fut) -> Result<T, E>
where
    Tm: Timer + ?Sized,
    Fut: Future<Output = Result<T, E>>,
    E: From<AttemptTimedOut>,
{
    let fut = pin!(fut);
    match select(fut, timer.sleep(timeout)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(E::from(AttemptTimedOut { after: timeout })),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::retry::TokioTimer;

    #[derive(Error, Debug, PartialEq)]
    enum TestError {
        #[error("transient")]
        Transient,
        #[error("fatal")]
        Fatal,
        #[error("timed out")]
        Timeout,
    }

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, Self::Transient | Self::Timeout)
        }
    }

    impl From<AttemptTimedOut> for TestError {
        fn from(_: AttemptTimedOut) -> Self {
            Self::Timeout
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_jitter: Duration::from_millis(10),
            attempt_timeout: Duration::from_millis(500),
            total_deadline: Duration::from_secs(30),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = execute(&policy(), Idempotency::Idempotent, &TokioTimer, |ctx| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(ctx.attempt, n);
            async move {
                if n <= 2 {
                    Err(TestError::Transient)
                } else {
                    Ok("payload")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_call_makes_exactly_max_attempts() {
        let p = policy();
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = execute(&p, Idempotency::Idempotent, &TokioTimer, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Transient) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Exhausted { attempts: 4, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(started.elapsed() >= p.total_backoff(3));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = execute(&policy(), Idempotency::Idempotent, &TokioTimer, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Fatal) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Rejected { attempts: 1, .. }));
        assert_eq!(err.last_error(), Some(&TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_idempotent_call_runs_once() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> =
            execute(&policy(), Idempotency::NonIdempotent, &TokioTimer, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempt_times_out_and_is_retried() {
        let calls = AtomicU32::new(0);

        let result = execute(&policy(), Idempotency::Idempotent, &TokioTimer, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    std::future::pending::<()>().await;
                }
                Ok::<_, TestError>(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_bounds_total_time() {
        let p = RetryPolicy {
            max_attempts: 10,
            max_jitter: Duration::ZERO,
            total_deadline: Duration::from_secs(2),
            ..policy()
        };
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = execute(&p, Idempotency::Idempotent, &TokioTimer, |_| async {
            std::future::pending::<()>().await;
            Ok::<(), TestError>(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::DeadlineExceeded { .. }));
        assert!(err.attempts() < 10);
        assert!(started.elapsed() <= Duration::from_secs(2));
        assert_eq!(err.last_error(), Some(&TestError::Timeout));
    }
}
