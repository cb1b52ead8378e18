//! Connection pool wrapper.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::DbError;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct DbPool(PgPool);

impl DbPool {
    /// Connect to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionFailed` if no connection can be opened.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(DbError::ConnectionFailed)?;
        Ok(Self(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self(pool)
    }

    pub fn inner(&self) -> &PgPool {
        &self.0
    }

    /// Run a trivial query to check connectivity.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(&self.0)
            .await
            .map_err(DbError::ConnectionFailed)?;
        Ok(())
    }
}
