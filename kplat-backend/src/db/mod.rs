//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - One bounded pool per process, checked out through RAII guards
//! - Acquisition is always bounded; a full pool is an error, not a hang
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - No retries here; errors are classified so the caller can decide

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod seed;

pub use error::DbError;
pub use pool::{Database, DatabaseConfig, PoolStatus};
pub use repos::*;
