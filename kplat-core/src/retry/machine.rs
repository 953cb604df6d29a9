//! Scheduler-agnostic retry state machine
//!
//! ```text
//! Attempting(n) --success--------------------------> Succeeded
//! Attempting(n) --non-transient failure------------> Failed(NonRetryable)
//! Attempting(n) --transient, n == budget-----------> Failed(Exhausted)
//! Attempting(n) --transient, backoff past deadline--> Failed(DeadlineExceeded)
//! Attempting(n) --transient------------------------> Waiting(n, delay)
//! Waiting(n)    --delay elapsed--------------------> Attempting(n + 1)
//! ```
//!
//! The machine takes the current instant and jitter sample as inputs, so the
//! same transitions hold under a blocking thread, an async runtime, or a test
//! clock.

use std::time::{Duration, Instant};

use super::policy::{Idempotency, RetryPolicy};

/// Why a call gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The failure was not classified as transient
    NonRetryable,
    /// The attempt budget is spent
    Exhausted,
    /// The next attempt could not start before the total deadline
    DeadlineExceeded,
}

/// Current state of one outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt number `attempt` (1-based) is due or in flight
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed transiently; sleep `delay` before the next one
    Waiting { attempt: u32, delay: Duration },
    Succeeded { attempts: u32 },
    Failed { attempts: u32, reason: FailureReason },
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Retry decisions for a single call.
///
/// Transitions that do not apply to the current state are ignored and return
/// the unchanged state.
#[derive(Debug)]
pub struct RetryMachine<'a> {
    policy: &'a RetryPolicy,
    max_attempts: u32,
    started: Instant,
    state: RetryState,
}

impl<'a> RetryMachine<'a> {
    pub fn new(policy: &'a RetryPolicy, idempotency: Idempotency, started: Instant) -> Self {
        Self {
            policy,
            max_attempts: policy.attempts_for(idempotency),
            started,
            state: RetryState::Attempting { attempt: 1 },
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Instant after which no attempt may start and no backoff may end.
    pub fn deadline(&self) -> Instant {
        self.started + self.policy.total_deadline
    }

    /// Start the pending attempt.
    ///
    /// Returns the attempt number and its timeout, `min(attempt_timeout,
    /// time left before the deadline)`. Returns `None` when not attempting or
    /// when the deadline has already passed, in which case the machine moves
    /// to `Failed(DeadlineExceeded)`.
    pub fn begin_attempt(&mut self, now: Instant) -> Option<(u32, Duration)> {
        let RetryState::Attempting { attempt } = self.state else {
            return None;
        };

        let remaining = self.deadline().saturating_duration_since(now);
        if remaining.is_zero() {
            self.state = RetryState::Failed {
                attempts: attempt - 1,
                reason: FailureReason::DeadlineExceeded,
            };
            return None;
        }

        Some((attempt, self.policy.attempt_timeout.min(remaining)))
    }

    pub fn record_success(&mut self) -> RetryState {
        if let RetryState::Attempting { attempt } = self.state {
            self.state = RetryState::Succeeded { attempts: attempt };
        }
        self.state
    }

    /// Record a failed attempt observed at `now`.
    ///
    /// `jitter` is added to the backoff if a retry is scheduled.
    pub fn record_failure(&mut self, transient: bool, now: Instant, jitter: Duration) -> RetryState {
        let RetryState::Attempting { attempt } = self.state else {
            return self.state;
        };

        self.state = if !transient {
            RetryState::Failed {
                attempts: attempt,
                reason: FailureReason::NonRetryable,
            }
        } else if attempt >= self.max_attempts {
            RetryState::Failed {
                attempts: attempt,
                reason: FailureReason::Exhausted,
            }
        } else {
            let delay = self.policy.delay_for(attempt, jitter);
            let elapsed = now.saturating_duration_since(self.started);
            if elapsed.saturating_add(delay) >= self.policy.total_deadline {
                RetryState::Failed {
                    attempts: attempt,
                    reason: FailureReason::DeadlineExceeded,
                }
            } else {
                RetryState::Waiting { attempt, delay }
            }
        };
        self.state
    }

    /// The backoff delay has elapsed; move on to the next attempt.
    pub fn finish_wait(&mut self) -> RetryState {
        if let RetryState::Waiting { attempt, .. } = self.state {
            self.state = RetryState::Attempting {
                attempt: attempt + 1,
            };
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_jitter: Duration::ZERO,
            attempt_timeout: Duration::from_millis(500),
            total_deadline: Duration::from_secs(5),
        }
    }

    #[test]
    fn success_on_first_attempt() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        assert_eq!(m.begin_attempt(t0), Some((1, Duration::from_millis(500))));
        assert_eq!(m.record_success(), RetryState::Succeeded { attempts: 1 });
        assert!(m.state().is_terminal());
    }

    #[test]
    fn walks_attempting_waiting_cycle_with_growing_delays() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        m.begin_attempt(t0);
        assert_eq!(
            m.record_failure(true, t0, Duration::ZERO),
            RetryState::Waiting {
                attempt: 1,
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(m.finish_wait(), RetryState::Attempting { attempt: 2 });

        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(m.begin_attempt(t1).map(|(n, _)| n), Some(2));
        assert_eq!(
            m.record_failure(true, t1, Duration::from_millis(7)),
            RetryState::Waiting {
                attempt: 2,
                delay: Duration::from_millis(207)
            }
        );
        m.finish_wait();

        let t2 = t1 + Duration::from_millis(207);
        m.begin_attempt(t2);
        assert_eq!(m.record_success(), RetryState::Succeeded { attempts: 3 });
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let p = policy();
        let mut now = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, now);

        loop {
            m.begin_attempt(now);
            match m.record_failure(true, now, Duration::ZERO) {
                RetryState::Waiting { delay, .. } => {
                    now += delay;
                    m.finish_wait();
                }
                state => {
                    assert_eq!(
                        state,
                        RetryState::Failed {
                            attempts: 3,
                            reason: FailureReason::Exhausted
                        }
                    );
                    break;
                }
            }
        }
    }

    #[test]
    fn non_transient_failure_stops_immediately() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        m.begin_attempt(t0);
        assert_eq!(
            m.record_failure(false, t0, Duration::ZERO),
            RetryState::Failed {
                attempts: 1,
                reason: FailureReason::NonRetryable
            }
        );
    }

    #[test]
    fn non_idempotent_call_is_not_retried() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::NonIdempotent, t0);

        m.begin_attempt(t0);
        assert_eq!(
            m.record_failure(true, t0, Duration::ZERO),
            RetryState::Failed {
                attempts: 1,
                reason: FailureReason::Exhausted
            }
        );
    }

    #[test]
    fn backoff_crossing_deadline_fails() {
        let p = RetryPolicy {
            total_deadline: Duration::from_millis(1000),
            ..policy()
        };
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        m.begin_attempt(t0);
        // 950ms elapsed + 100ms backoff crosses the 1s deadline
        let late = t0 + Duration::from_millis(950);
        assert_eq!(
            m.record_failure(true, late, Duration::ZERO),
            RetryState::Failed {
                attempts: 1,
                reason: FailureReason::DeadlineExceeded
            }
        );
    }

    #[test]
    fn attempt_timeout_is_clamped_to_remaining_deadline() {
        let p = RetryPolicy {
            total_deadline: Duration::from_millis(800),
            ..policy()
        };
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        m.begin_attempt(t0);
        m.record_failure(true, t0 + Duration::from_millis(500), Duration::ZERO);
        m.finish_wait();

        let (attempt, timeout) = m.begin_attempt(t0 + Duration::from_millis(600)).unwrap();
        assert_eq!(attempt, 2);
        assert_eq!(timeout, Duration::from_millis(200));
    }

    #[test]
    fn begin_attempt_after_deadline_fails() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        assert_eq!(m.begin_attempt(t0 + Duration::from_secs(6)), None);
        assert_eq!(
            m.state(),
            RetryState::Failed {
                attempts: 0,
                reason: FailureReason::DeadlineExceeded
            }
        );
    }

    #[test]
    fn out_of_order_transitions_are_ignored() {
        let p = policy();
        let t0 = Instant::now();
        let mut m = RetryMachine::new(&p, Idempotency::Idempotent, t0);

        assert_eq!(m.finish_wait(), RetryState::Attempting { attempt: 1 });
        m.record_success();
        assert_eq!(
            m.record_failure(true, t0, Duration::ZERO),
            RetryState::Succeeded { attempts: 1 }
        );
        assert_eq!(m.begin_attempt(t0), None);
    }
}
