//! Classified failures of a single backend call

use std::error::Error as _;
use std::io;
use std::time::Duration;

use kplat_core::{AttemptTimedOut, Transient};
use reqwest::StatusCode;

/// Longest upstream error body kept for logs and responses
const MAX_BODY_EXCERPT: usize = 500;

/// Failure of one attempt against the backend
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Refused, reset or otherwise dropped connection
    #[error("cannot reach backend: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("backend did not answer within {after:?}")]
    Timeout { after: Duration },

    /// Backend answered with a non-success status
    #[error("backend returned {status}")]
    Status { status: StatusCode, body: String },

    #[error("undecodable backend response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Anything not positively identified above
    #[error("backend request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Classify a transport error from reqwest.
    ///
    /// A request-phase failure means the connection went away before any
    /// response arrived: a peer that closed mid-request or a stale pooled
    /// keep-alive connection.
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            Self::Timeout { after: timeout }
        } else if e.is_connect() || e.is_request() || is_connection_drop(&e) {
            Self::Connect(e)
        } else if e.is_decode() {
            Self::Decode(e)
        } else {
            Self::Request(e)
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_BODY_EXCERPT) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        Self::Status { status, body }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Upstream status code, when the backend answered at all.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Transient for UpstreamError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Decode(_) | Self::Request(_) => false,
        }
    }
}

impl From<AttemptTimedOut> for UpstreamError {
    fn from(e: AttemptTimedOut) -> Self {
        Self::Timeout { after: e.after }
    }
}

/// Whether the error chain bottoms out in a reset or aborted connection.
fn is_connection_drop(e: &reqwest::Error) -> bool {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            return matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::BrokenPipe
            );
        }
        source = err.source();
    }
    false
}
