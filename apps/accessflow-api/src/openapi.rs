//! `OpenAPI` document for the accessflow API.
//!
//! Served as JSON at `/api-doc/openapi.json`.

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use accessflow_api_requests::models::{
    AccessRequestListResponse, AccessRequestResponse, ActivityEntryResponse,
    ApproveAccessRequestRequest, ApproveAccessRequestResponse, CatalogCategoryResponse,
    CatalogItemResponse, CatalogResponse, DecisionResponse, RequestStatsResponse,
    RequestedItemsDto, SubmitAccessRequestRequest, SubmitAccessRequestResponse,
};
use accessflow_api_requests::ErrorResponse;

use crate::health::HealthResponse;
use crate::state::AppState;

/// Security scheme modifier for Bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "accessflow API",
        version = "0.1.0",
        description = "Submit, review and decide requests for access to internal systems"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Access Catalog", description = "Grantable access items"),
        (name = "Access Requests", description = "Access request submission and review")
    ),
    paths(
        crate::health::health_handler,
        accessflow_api_requests::handlers::catalog::get_catalog,
        accessflow_api_requests::handlers::access_requests::submit_request,
        accessflow_api_requests::handlers::access_requests::list_requests,
        accessflow_api_requests::handlers::access_requests::list_my_requests,
        accessflow_api_requests::handlers::access_requests::get_stats,
        accessflow_api_requests::handlers::access_requests::get_recent_activity,
        accessflow_api_requests::handlers::access_requests::get_request,
        accessflow_api_requests::handlers::access_requests::approve_request,
        accessflow_api_requests::handlers::access_requests::reject_request,
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        RequestedItemsDto,
        SubmitAccessRequestRequest,
        SubmitAccessRequestResponse,
        ApproveAccessRequestRequest,
        ApproveAccessRequestResponse,
        DecisionResponse,
        AccessRequestResponse,
        AccessRequestListResponse,
        RequestStatsResponse,
        ActivityEntryResponse,
        CatalogResponse,
        CatalogCategoryResponse,
        CatalogItemResponse,
    ))
)]
pub struct ApiDoc;

/// Route serving the generated document.
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route(
        "/api-doc/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
