//! Application state shared across handlers

use std::sync::Arc;

use kplat_core::ReadinessGate;

use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    readiness: ReadinessGate,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                readiness: ReadinessGate::new(),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.inner.readiness
    }
}
