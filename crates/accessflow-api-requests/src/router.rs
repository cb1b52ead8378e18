//! Router configuration for the access request API.

use std::sync::Arc;

use accessflow_governance::RequestLifecycleService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{access_requests, catalog};
use crate::middleware::{bearer_auth_middleware, AuthSettings};

/// State shared by the access request handlers.
#[derive(Clone)]
pub struct RequestsState {
    pub lifecycle: Arc<RequestLifecycleService>,
}

impl RequestsState {
    pub fn new(lifecycle: Arc<RequestLifecycleService>) -> Self {
        Self { lifecycle }
    }
}

/// Build the `/api/v1` router. Every route requires a bearer token.
pub fn requests_router(lifecycle: Arc<RequestLifecycleService>, auth: Arc<AuthSettings>) -> Router {
    let state = RequestsState::new(lifecycle);

    let api = Router::new()
        .route("/access-catalog", get(catalog::get_catalog))
        .route(
            "/access-requests",
            get(access_requests::list_requests).post(access_requests::submit_request),
        )
        .route(
            "/access-requests/mine",
            get(access_requests::list_my_requests),
        )
        .route("/access-requests/stats", get(access_requests::get_stats))
        .route(
            "/access-requests/activity",
            get(access_requests::get_recent_activity),
        )
        .route("/access-requests/:id", get(access_requests::get_request))
        .route(
            "/access-requests/:id/approve",
            post(access_requests::approve_request),
        )
        .route(
            "/access-requests/:id/reject",
            post(access_requests::reject_request),
        )
        .layer(middleware::from_fn_with_state(auth, bearer_auth_middleware))
        .with_state(state);

    Router::new().nest("/api/v1", api)
}
