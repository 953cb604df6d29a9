//! Configuration errors detected at process start.
//!
//! Any of these prevents a service from ever reaching READY; the binary
//! reports them and exits.

use thiserror::Error;

/// Invalid startup configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting is outside its accepted range
    #[error("invalid value for {field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    /// A required setting is missing or empty
    #[error("missing required setting {field}")]
    Missing { field: &'static str },

    /// A URL or address could not be parsed
    #[error("invalid {field} '{value}': {reason}")]
    Malformed {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Create an out-of-range error
    pub fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            reason: reason.into(),
        }
    }

    /// Create a malformed-value error
    pub fn malformed(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConfigError::out_of_range("max_attempts", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for max_attempts: must be at least 1"
        );

        let err = ConfigError::Missing { field: "DB_HOST" };
        assert_eq!(err.to_string(), "missing required setting DB_HOST");
    }
}
