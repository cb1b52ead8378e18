//! Application state shared by the server-level handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use accessflow_db::DbPool;

/// State for health and server-level routes.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database pool; `None` when running on the in-memory store.
    pub db: Option<DbPool>,

    /// Service startup time for uptime calculation.
    pub startup_time: Arc<Instant>,

    /// Application version from Cargo.toml.
    pub version: &'static str,

    /// Set once a shutdown signal arrives; health then reports 503.
    pub shutting_down: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(db: Option<DbPool>) -> Self {
        Self {
            db,
            startup_time: Arc::new(Instant::now()),
            version: env!("CARGO_PKG_VERSION"),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.startup_time.elapsed().as_secs()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Mark the service as shutting down.
    pub fn mark_shutting_down(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }
}
