//! Mapping of failed backend calls to gateway responses
//!
//! | failure                                  | status |
//! |------------------------------------------|--------|
//! | deadline exceeded, or last attempt timed out | 504 |
//! | anything else (5xx, connect, 4xx, decode)| 502    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kplat_core::RetryError;
use serde_json::json;

use crate::upstream::UpstreamError;

/// A backend call that could not produce data
#[derive(Debug)]
pub struct ProxyError {
    error: RetryError<UpstreamError>,
    request_id: String,
}

impl ProxyError {
    pub fn new(error: RetryError<UpstreamError>, request_id: impl Into<String>) -> Self {
        Self {
            error,
            request_id: request_id.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        match &self.error {
            RetryError::DeadlineExceeded { .. } => true,
            other => other.last_error().is_some_and(UpstreamError::is_timeout),
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let attempts = self.error.attempts();
        let upstream_status = self
            .error
            .last_error()
            .and_then(UpstreamError::upstream_status)
            .map(|s| s.as_u16());

        tracing::error!(
            request_id = %self.request_id,
            attempts,
            error = %self.error,
            "Backend call failed"
        );

        let body = if self.is_timeout() {
            json!({
                "error": "Backend service timeout",
                "message": "The backend service took too long to respond",
                "attempts": attempts,
            })
        } else if let Some(code) = upstream_status {
            json!({
                "error": "Backend error",
                "message": "Backend returned an error",
                "upstream_status": code,
                "attempts": attempts,
            })
        } else {
            json!({
                "error": "Backend service unavailable",
                "message": "Could not get a usable response from the backend service",
                "attempts": attempts,
            })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn proxy(error: RetryError<UpstreamError>) -> ProxyError {
        ProxyError::new(error, "test")
    }

    #[test]
    fn deadline_is_504() {
        let err = proxy(RetryError::DeadlineExceeded {
            attempts: 2,
            deadline: Duration::from_secs(15),
            last: None,
        });
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn exhausted_timeouts_are_504() {
        let err = proxy(RetryError::Exhausted {
            attempts: 4,
            source: UpstreamError::Timeout {
                after: Duration::from_secs(5),
            },
        });
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn exhausted_server_errors_are_502() {
        let err = proxy(RetryError::Exhausted {
            attempts: 4,
            source: UpstreamError::status(StatusCode::SERVICE_UNAVAILABLE, ""),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn client_errors_are_502_with_upstream_status() {
        let err = proxy(RetryError::Rejected {
            attempts: 1,
            source: UpstreamError::status(StatusCode::NOT_FOUND, "no such route"),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
