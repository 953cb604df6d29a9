use std::time::Duration;

use thiserror::Error;

use super::machine::FailureReason;

/// Terminal failure of a retried call
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// The failure was not transient; no retry was attempted
    #[error("non-retryable failure on attempt {attempts}: {source}")]
    Rejected { attempts: u32, source: E },

    /// Every allowed attempt failed transiently
    #[error("gave up after {attempts} attempt(s): {source}")]
    Exhausted { attempts: u32, source: E },

    /// The total deadline left no room for another attempt
    #[error("deadline of {deadline:?} exceeded after {attempts} attempt(s)")]
    DeadlineExceeded {
        attempts: u32,
        deadline: Duration,
        last: Option<E>,
    },
}

impl<E> RetryError<E> {
    pub(crate) fn from_failure(
        reason: FailureReason,
        attempts: u32,
        deadline: Duration,
        last: Option<E>,
    ) -> Self {
        match (reason, last) {
            (FailureReason::NonRetryable, Some(source)) => Self::Rejected { attempts, source },
            (FailureReason::Exhausted, Some(source)) => Self::Exhausted { attempts, source },
            (_, last) => Self::DeadlineExceeded {
                attempts,
                deadline,
                last,
            },
        }
    }

    /// Number of attempts actually made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Rejected { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::DeadlineExceeded { attempts, .. } => *attempts,
        }
    }

    /// Error returned by the last attempt, if any attempt ran
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Rejected { source, .. } | Self::Exhausted { source, .. } => Some(source),
            Self::DeadlineExceeded { last, .. } => last.as_ref(),
        }
    }
}
