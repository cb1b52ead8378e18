//! Access catalog handler.

use axum::Json;

use crate::models::CatalogResponse;

/// Get the access catalog.
///
/// Lists every category with its grantable items in display order, plus
/// the departments a requester can belong to.
#[utoipa::path(
    get,
    path = "/api/v1/access-catalog",
    tag = "Access Catalog",
    responses(
        (status = 200, description = "Access catalog", body = CatalogResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse::build())
}
