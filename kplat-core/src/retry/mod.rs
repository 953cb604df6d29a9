//! Retry with exponential backoff, jitter, per-attempt timeouts and a total deadline
//!
//! The decision logic lives in [`RetryMachine`], a synchronous state machine
//! (`Attempting -> Waiting -> Attempting -> Succeeded | Failed`) that never
//! sleeps or spawns. [`execute`] drives it on any [`Timer`]; [`TokioTimer`]
//! is the runtime implementation.

mod error;
mod executor;
mod machine;
mod policy;
mod timer;

pub use error::RetryError;
pub use executor::{execute, AttemptContext, AttemptTimedOut, Transient};
pub use machine::{FailureReason, RetryMachine, RetryState};
pub use policy::{Idempotency, RetryPolicy};
pub use timer::{Timer, TokioTimer};
