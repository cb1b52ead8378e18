//! PostgreSQL persistence for accessflow.
//!
//! Provides the connection pool wrapper, embedded migrations, the
//! `access_requests` row model and [`PgRequestStore`], the Postgres
//! implementation of [`accessflow_governance::RequestStore`].

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod store;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::AccessRequestRow;
pub use pool::DbPool;
pub use store::PgRequestStore;
