//! Access request HTTP API.
//!
//! Axum router, handlers, request/response models and error mapping for
//! the `/api/v1` access request endpoints. Every route requires a bearer
//! token; [`middleware::bearer_auth_middleware`] verifies it and inserts
//! the resolved [`accessflow_auth::Principal`] into request extensions.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;

pub use error::{ApiRequestsError, ApiResult, ErrorResponse};
pub use middleware::AuthSettings;
pub use router::{requests_router, RequestsState};
