//! Access request handlers.

use accessflow_auth::Principal;
use accessflow_governance::{RequestId, SubmitRequestInput};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{
    AccessRequestListResponse, AccessRequestResponse, ActivityEntryResponse,
    ApproveAccessRequestRequest, ApproveAccessRequestResponse, DecisionResponse,
    ListAccessRequestsQuery, RecentActivityQuery, RequestStatsResponse,
    SubmitAccessRequestRequest, SubmitAccessRequestResponse,
};
use crate::router::RequestsState;

/// Submit a new access request.
#[utoipa::path(
    post,
    path = "/api/v1/access-requests",
    tag = "Access Requests",
    request_body = SubmitAccessRequestRequest,
    responses(
        (status = 201, description = "Access request created", body = SubmitAccessRequestResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Email does not belong to the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_request(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<SubmitAccessRequestRequest>,
) -> ApiResult<(StatusCode, Json<SubmitAccessRequestResponse>)> {
    request.validate()?;
    let input = SubmitRequestInput::try_from(request)?;

    let created = state.lifecycle.submit(&principal, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitAccessRequestResponse {
            status: created.status.as_str().to_string(),
            id: created.id.into_inner(),
        }),
    ))
}

/// List all access requests.
#[utoipa::path(
    get,
    path = "/api/v1/access-requests",
    tag = "Access Requests",
    params(ListAccessRequestsQuery),
    responses(
        (status = 200, description = "List of access requests", body = AccessRequestListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an approver"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListAccessRequestsQuery>,
) -> ApiResult<Json<AccessRequestListResponse>> {
    let (filter, options) = query.into_parts()?;
    let page = state.lifecycle.list_all(&principal, filter, options).await?;
    Ok(Json(page.into()))
}

/// List the caller's own access requests.
#[utoipa::path(
    get,
    path = "/api/v1/access-requests/mine",
    tag = "Access Requests",
    params(ListAccessRequestsQuery),
    responses(
        (status = 200, description = "List of access requests", body = AccessRequestListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_requests(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListAccessRequestsQuery>,
) -> ApiResult<Json<AccessRequestListResponse>> {
    let (filter, options) = query.into_parts()?;
    let page = state.lifecycle.list_mine(&principal, filter, options).await?;
    Ok(Json(page.into()))
}

/// Get request counts by status.
#[utoipa::path(
    get,
    path = "/api/v1/access-requests/stats",
    tag = "Access Requests",
    responses(
        (status = 200, description = "Request statistics", body = RequestStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an approver"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_stats(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<RequestStatsResponse>> {
    let stats = state.lifecycle.stats(&principal).await?;
    Ok(Json(stats.into()))
}

/// Get the most recent request activity.
#[utoipa::path(
    get,
    path = "/api/v1/access-requests/activity",
    tag = "Access Requests",
    params(RecentActivityQuery),
    responses(
        (status = 200, description = "Recent activity, newest first", body = Vec<ActivityEntryResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an approver"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_recent_activity(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RecentActivityQuery>,
) -> ApiResult<Json<Vec<ActivityEntryResponse>>> {
    let entries = state
        .lifecycle
        .recent_activity(&principal, query.limit)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Get an access request by ID.
#[utoipa::path(
    get,
    path = "/api/v1/access-requests/{id}",
    tag = "Access Requests",
    params(
        ("id" = String, Path, description = "Access request ID")
    ),
    responses(
        (status = 200, description = "Access request details", body = AccessRequestResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Access request not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state.lifecycle.get(&principal, &RequestId::from(id)).await?;
    Ok(Json(request.into()))
}

/// Approve an access request, granting a subset of the requested items.
#[utoipa::path(
    post,
    path = "/api/v1/access-requests/{id}/approve",
    tag = "Access Requests",
    params(
        ("id" = String, Path, description = "Access request ID")
    ),
    request_body = ApproveAccessRequestRequest,
    responses(
        (status = 200, description = "Access request approved", body = ApproveAccessRequestResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an approver"),
        (status = 404, description = "Access request not found"),
        (status = 409, description = "Access request already decided"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_request(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<ApproveAccessRequestRequest>,
) -> ApiResult<Json<ApproveAccessRequestResponse>> {
    request.validate()?;

    let approved = state
        .lifecycle
        .approve(&principal, &RequestId::from(id), request.into_set())
        .await?;

    Ok(Json(approved.into()))
}

/// Reject an access request.
#[utoipa::path(
    post,
    path = "/api/v1/access-requests/{id}/reject",
    tag = "Access Requests",
    params(
        ("id" = String, Path, description = "Access request ID")
    ),
    responses(
        (status = 200, description = "Access request rejected", body = DecisionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an approver"),
        (status = 404, description = "Access request not found"),
        (status = 409, description = "Access request already decided"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_request(
    State(state): State<RequestsState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<DecisionResponse>> {
    let rejected = state
        .lifecycle
        .reject(&principal, &RequestId::from(id))
        .await?;
    Ok(Json(rejected.into()))
}
