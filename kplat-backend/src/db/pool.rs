//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit min/max connection limits. The pool is
//! created once at startup and handed to request handlers through
//! [`AppState`](crate::state::AppState); each checkout is a scoped
//! `PoolConnection` that returns to the pool when dropped, on every exit path.

use std::str::FromStr;
use std::time::Duration;

use kplat_core::ConfigError;
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres};

use super::error::DbError;

/// Connection settings and pool limits
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; overrides the individual fields when set
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Longest a request waits for a free connection
    pub acquire_timeout: Duration,
    /// Acquisition budget of the readiness probe
    pub probe_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "postgres".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            min_connections: 2,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(1),
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_none() && self.host.trim().is_empty() {
            return Err(ConfigError::Missing { field: "DB_HOST" });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::out_of_range(
                "DB_MAX_CONN",
                "must be at least 1",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::out_of_range(
                "DB_MIN_CONN",
                format!(
                    "{} exceeds DB_MAX_CONN ({})",
                    self.min_connections, self.max_connections
                ),
            ));
        }
        if self.acquire_timeout.is_zero() {
            return Err(ConfigError::out_of_range(
                "DB_ACQUIRE_TIMEOUT_MS",
                "must be greater than zero",
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::out_of_range(
                "DB_PROBE_TIMEOUT_MS",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match &self.url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::malformed("DATABASE_URL", "<redacted>", e.to_string())),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .database(&self.name)
                .username(&self.user)
                .password(&self.password)),
        }
    }
}

/// Point-in-time pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections, idle or checked out
    pub size: u32,
    pub idle: u32,
    pub max: u32,
    /// Connections that could still be handed out
    pub available: u32,
}

impl PoolStatus {
    fn new(size: u32, idle: u32, max: u32) -> Self {
        let in_use = size.saturating_sub(idle);
        Self {
            size,
            idle,
            max,
            available: max.saturating_sub(in_use),
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.available == 0
    }

    /// Occupancy once one checked-out connection goes back to the pool.
    fn with_one_released(self) -> Self {
        Self::new(self.size, (self.idle + 1).min(self.size), self.max)
    }
}

/// Process-wide handle to the bounded connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    max_connections: u32,
    acquire_timeout: Duration,
    probe_timeout: Duration,
}

impl Database {
    /// Build the pool.
    ///
    /// Connections are opened lazily, so this succeeds while Postgres is still
    /// unreachable; invalid configuration is rejected here.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        config.validate()?;
        let options = config.connect_options()?;

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        tracing::info!(
            min = config.min_connections,
            max = config.max_connections,
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Database connection pool created"
        );

        Ok(Self {
            pool,
            max_connections: config.max_connections,
            acquire_timeout: config.acquire_timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }

    /// Check out a connection, failing after `timeout`.
    ///
    /// A timeout while the pool is saturated is `PoolExhausted`; a timeout
    /// while there was room means no new connection could be opened, which is
    /// `Unavailable`.
    pub async fn acquire(&self, timeout: Duration) -> Result<PoolConnection<Postgres>, DbError> {
        match tokio::time::timeout(timeout, self.pool.acquire()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(sqlx::Error::PoolTimedOut)) | Err(_) => Err(self.timed_out(timeout)),
            Ok(Err(e)) => Err(DbError::from(e)),
        }
    }

    fn timed_out(&self, waited: Duration) -> DbError {
        if self.status().is_saturated() {
            tracing::warn!(waited_ms = waited.as_millis() as u64, "connection pool exhausted");
            DbError::PoolExhausted { waited }
        } else {
            DbError::Unavailable(sqlx::Error::PoolTimedOut)
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Readiness probe: acquire and run `SELECT 1`, each within `timeout`.
    pub async fn probe(&self, timeout: Duration) -> Result<PoolStatus, DbError> {
        let mut conn = self.acquire(timeout).await?;
        let _: i32 = match tokio::time::timeout(
            timeout,
            sqlx::query_scalar("SELECT 1").fetch_one(&mut *conn),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(DbError::Unavailable(sqlx::Error::PoolTimedOut)),
        };
        // Still holding the probe connection; count it as returned.
        let status = self.status().with_one_released();
        drop(conn);
        Ok(status)
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus::new(
            self.pool.size(),
            self.pool.num_idle() as u32,
            self.max_connections,
        )
    }

    /// Close every connection; further acquires fail.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p kplat-backend -- --ignored

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            min_connections: 0,
            max_connections: 2,
            acquire_timeout: Duration::from_millis(200),
            probe_timeout: Duration::from_millis(200),
            ..DatabaseConfig::default()
        }
    }

    fn live_config(max_connections: u32) -> DatabaseConfig {
        DatabaseConfig {
            url: Some(std::env::var("DATABASE_URL").expect("DATABASE_URL required")),
            min_connections: 0,
            max_connections,
            acquire_timeout: Duration::from_millis(300),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(DatabaseConfig::default().validate().is_ok());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let config = DatabaseConfig {
            min_connections: 5,
            max_connections: 2,
            ..DatabaseConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "DB_MIN_CONN",
                ..
            })
        ));
    }

    #[test]
    fn malformed_url_is_fatal() {
        let config = DatabaseConfig {
            url: Some("not a url".into()),
            ..DatabaseConfig::default()
        };
        assert!(matches!(
            config.connect_options(),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn pool_status_arithmetic() {
        let status = PoolStatus::new(4, 1, 5);
        assert_eq!(status.available, 2);
        assert!(!status.is_saturated());
        assert!(PoolStatus::new(5, 0, 5).is_saturated());
    }

    #[test]
    fn released_connection_counts_as_available() {
        let held = PoolStatus::new(3, 0, 3);
        assert!(held.is_saturated());
        let released = held.with_one_released();
        assert_eq!(released.idle, 1);
        assert_eq!(released.available, 1);

        let all_idle = PoolStatus::new(2, 2, 4).with_one_released();
        assert_eq!(all_idle.idle, 2);
        assert_eq!(all_idle.available, 4);
    }

    #[tokio::test]
    async fn probe_fails_when_database_unreachable() {
        let db = Database::connect(&unreachable_config()).unwrap();
        let err = db.probe(db.probe_timeout()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn probe_succeeds_against_live_database() {
        let db = Database::connect(&live_config(2)).unwrap();
        let status = db.probe(Duration::from_secs(1)).await.expect("probe failed");
        assert_eq!(status.max, 2);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn excess_callers_get_pool_exhausted() {
        let db = Database::connect(&live_config(2)).unwrap();
        let timeout = Duration::from_millis(300);

        let _a = db.acquire(timeout).await.expect("first checkout");
        let _b = db.acquire(timeout).await.expect("second checkout");

        let started = std::time::Instant::now();
        let err = db.acquire(timeout).await.unwrap_err();
        assert!(matches!(err, DbError::PoolExhausted { .. }));
        assert!(started.elapsed() >= timeout);
        assert!(started.elapsed() < timeout * 10);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn released_connection_is_reused() {
        let db = Database::connect(&live_config(1)).unwrap();
        let timeout = Duration::from_millis(300);

        let conn = db.acquire(timeout).await.expect("checkout");
        drop(conn);
        assert!(db.acquire(timeout).await.is_ok());
    }
}
