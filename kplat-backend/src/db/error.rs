//! Database error classification
//!
//! Errors are typed so the HTTP layer can map them without guessing and the
//! caller that owns retries can tell transient from fatal. This layer never
//! retries.

use std::time::Duration;

use kplat_core::ConfigError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Every connection is checked out and none came back in time
    #[error("connection pool exhausted: no connection available within {waited:?}")]
    PoolExhausted { waited: Duration },

    /// Network, TLS or server-availability failure
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// Bad credentials or authorization failure (SQLSTATE class 28)
    #[error("database authentication failed: {0}")]
    Authentication(#[source] sqlx::Error),

    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: String },

    #[error("check constraint {constraint} violated")]
    CheckViolation { constraint: String },

    #[error("database error: {0}")]
    Query(#[source] sqlx::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DbError {
    /// Whether a caller may retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. } | Self::Unavailable(_))
    }
}

/// Coarse meaning of a Postgres SQLSTATE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SqlState {
    Authentication,
    UniqueViolation,
    CheckViolation,
    Unavailable,
    Other,
}

impl SqlState {
    pub(crate) fn classify(code: &str) -> Self {
        match code {
            "23505" => Self::UniqueViolation,
            "23514" => Self::CheckViolation,
            // too_many_connections, admin_shutdown, crash_shutdown, cannot_connect_now
            "53300" | "57P01" | "57P02" | "57P03" => Self::Unavailable,
            _ if code.starts_with("28") => Self::Authentication,
            _ if code.starts_with("08") => Self::Unavailable,
            _ => Self::Other,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed => Self::Unavailable(e),
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
                let constraint = db.constraint().unwrap_or("unknown").to_owned();
                match SqlState::classify(&code) {
                    SqlState::Authentication => Self::Authentication(e),
                    SqlState::UniqueViolation => Self::UniqueViolation { constraint },
                    SqlState::CheckViolation => Self::CheckViolation { constraint },
                    SqlState::Unavailable => Self::Unavailable(e),
                    SqlState::Other => Self::Query(e),
                }
            }
            _ => Self::Query(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_sqlstates() {
        assert_eq!(SqlState::classify("23505"), SqlState::UniqueViolation);
        assert_eq!(SqlState::classify("23514"), SqlState::CheckViolation);
        assert_eq!(SqlState::classify("28P01"), SqlState::Authentication);
        assert_eq!(SqlState::classify("28000"), SqlState::Authentication);
        assert_eq!(SqlState::classify("08006"), SqlState::Unavailable);
        assert_eq!(SqlState::classify("57P01"), SqlState::Unavailable);
        assert_eq!(SqlState::classify("42P01"), SqlState::Other);
        assert_eq!(SqlState::classify(""), SqlState::Other);
    }

    #[test]
    fn io_errors_are_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DbError::from(sqlx::Error::Io(io));
        assert!(matches!(err, DbError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn pool_closed_is_unavailable() {
        assert!(DbError::from(sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn row_errors_are_not_transient() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Query(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn exhaustion_is_transient() {
        let err = DbError::PoolExhausted {
            waited: Duration::from_millis(250),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("250ms"));
    }
}
