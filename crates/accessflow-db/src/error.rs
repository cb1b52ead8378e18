//! Error types for the accessflow-db crate.

use accessflow_governance::GovernanceError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// A stored row could not be mapped back to the domain type.
    #[error("Invalid row {id}: {message}")]
    InvalidRow { id: String, message: String },
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        Self::QueryFailed(err)
    }
}

impl From<DbError> for GovernanceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::QueryFailed(e) | DbError::ConnectionFailed(e) => Self::Database(e),
            other => Self::Store(other.to_string()),
        }
    }
}
