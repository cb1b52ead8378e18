//! Request and response models for access request endpoints.

use std::collections::BTreeSet;

use accessflow_governance::services::DEFAULT_PAGE_LIMIT;
use accessflow_governance::{
    AccessRequest, ActivityEntry, Category, Department, ListOptions, RequestFilter, RequestPage,
    RequestStats, RequestStatus, RequestedItems, Requester, SubmitRequestInput,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ApiRequestsError, ApiResult};

// ============================================================================
// Shared
// ============================================================================

/// Catalog item names selected per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestedItemsDto {
    #[serde(default)]
    pub main_cloud: Vec<String>,
    #[serde(default)]
    pub gov_cloud: Vec<String>,
    #[serde(default)]
    pub log_search: Vec<String>,
    #[serde(default)]
    pub search_index: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl From<RequestedItemsDto> for RequestedItems {
    fn from(dto: RequestedItemsDto) -> Self {
        let mut items = RequestedItems::default();
        for (category, names) in [
            (Category::MainCloud, dto.main_cloud),
            (Category::GovCloud, dto.gov_cloud),
            (Category::LogSearch, dto.log_search),
            (Category::SearchIndex, dto.search_index),
            (Category::Other, dto.other),
        ] {
            items
                .get_mut(category)
                .extend(names.into_iter().map(|n| n.trim().to_string()));
        }
        items
    }
}

impl From<&RequestedItems> for RequestedItemsDto {
    fn from(items: &RequestedItems) -> Self {
        let list =
            |category: Category| -> Vec<String> { items.get(category).iter().cloned().collect() };
        Self {
            main_cloud: list(Category::MainCloud),
            gov_cloud: list(Category::GovCloud),
            log_search: list(Category::LogSearch),
            search_index: list(Category::SearchIndex),
            other: list(Category::Other),
        }
    }
}

// ============================================================================
// Submit
// ============================================================================

/// Request to submit a new access request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitAccessRequestRequest {
    /// Email of the employee who needs access.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    /// Full name of the employee.
    #[validate(length(min = 2, max = 50, message = "Full name must be 2-50 characters"))]
    pub full_name: String,

    /// Department name, e.g. "Engineering".
    pub department: String,

    /// Job title of the employee.
    #[validate(length(min = 2, max = 50, message = "Job title must be 2-50 characters"))]
    pub job_title: String,

    /// Selected catalog items. At least one item is required.
    #[serde(default)]
    pub requested_items: RequestedItemsDto,
}

impl TryFrom<SubmitAccessRequestRequest> for SubmitRequestInput {
    type Error = ApiRequestsError;

    fn try_from(request: SubmitAccessRequestRequest) -> ApiResult<Self> {
        let department: Department = request
            .department
            .parse()
            .map_err(ApiRequestsError::Validation)?;

        Ok(Self {
            requester: Requester {
                email: request.email,
                full_name: request.full_name,
                department,
                job_title: request.job_title,
            },
            requested_items: request.requested_items.into(),
        })
    }
}

/// Response after submitting an access request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitAccessRequestResponse {
    /// The new request's ID.
    pub id: String,

    /// Always "pending".
    #[schema(example = "pending")]
    pub status: String,
}

// ============================================================================
// Decisions
// ============================================================================

/// Request to approve an access request.
///
/// Items that were not part of the original request are ignored. An empty
/// list approves the request without granting anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveAccessRequestRequest {
    /// Item names to grant, across all categories.
    #[serde(default)]
    #[validate(length(max = 200, message = "At most 200 items can be approved"))]
    pub approved_items: Vec<String>,
}

impl ApproveAccessRequestRequest {
    pub fn into_set(self) -> BTreeSet<String> {
        self.approved_items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Response after approving an access request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApproveAccessRequestResponse {
    pub id: String,
    #[schema(example = "approved")]
    pub status: String,
    /// Items that were granted.
    pub approved_items: Vec<String>,
    /// Requested items that were not granted.
    pub denied_items: Vec<String>,
}

impl From<AccessRequest> for ApproveAccessRequestResponse {
    fn from(request: AccessRequest) -> Self {
        Self {
            approved_items: request.granted_items().into_iter().collect(),
            denied_items: request.denied_items().into_iter().collect(),
            status: request.status.as_str().to_string(),
            id: request.id.into_inner(),
        }
    }
}

/// Response after rejecting an access request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    pub id: String,
    #[schema(example = "rejected")]
    pub status: String,
}

impl From<AccessRequest> for DecisionResponse {
    fn from(request: AccessRequest) -> Self {
        Self {
            status: request.status.as_str().to_string(),
            id: request.id.into_inner(),
        }
    }
}

// ============================================================================
// Read models
// ============================================================================

/// Access request details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub department: String,
    pub job_title: String,
    pub requested_items: RequestedItemsDto,

    /// One of "pending", "approved", "rejected".
    pub status: String,

    /// Granted items; present once approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_items: Option<Vec<String>>,

    /// Requested items that were not granted; empty while pending.
    pub denied_items: Vec<String>,

    /// Email of the approver who decided the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccessRequest> for AccessRequestResponse {
    fn from(request: AccessRequest) -> Self {
        Self {
            requested_items: RequestedItemsDto::from(&request.requested_items),
            denied_items: request.denied_items().into_iter().collect(),
            id: request.id.into_inner(),
            email: request.requester.email,
            full_name: request.requester.full_name,
            department: request.requester.department.as_str().to_string(),
            job_title: request.requester.job_title,
            status: request.status.as_str().to_string(),
            approved_items: request.approved_items.map(|items| items.into_iter().collect()),
            approver: request.approver,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Query parameters for listing access requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListAccessRequestsQuery {
    /// Filter by status ("pending", "approved", "rejected").
    pub status: Option<String>,

    /// Filter by department name.
    pub department: Option<String>,

    /// Case-insensitive match on requester name, email or department.
    pub search: Option<String>,

    /// Maximum number of results (default: 50, max: 100).
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,

    /// Number of results to skip.
    #[param(minimum = 0)]
    pub offset: Option<i64>,
}

impl ListAccessRequestsQuery {
    /// Split into a store filter and pagination options.
    pub fn into_parts(self) -> ApiResult<(RequestFilter, ListOptions)> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<RequestStatus>)
            .transpose()
            .map_err(ApiRequestsError::Validation)?;
        let department = self
            .department
            .as_deref()
            .map(str::parse::<Department>)
            .transpose()
            .map_err(ApiRequestsError::Validation)?;
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let filter = RequestFilter {
            status,
            department,
            requester_email: None,
            search,
        };
        let options = ListOptions {
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            offset: self.offset.unwrap_or(0),
        };
        Ok((filter, options))
    }
}

/// Paginated list of access requests, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestListResponse {
    pub items: Vec<AccessRequestResponse>,
    /// Number of requests matching the filter.
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
}

impl From<RequestPage> for AccessRequestListResponse {
    fn from(page: RequestPage) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Request counts by status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestStatsResponse {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl From<RequestStats> for RequestStatsResponse {
    fn from(stats: RequestStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            approved: stats.approved,
            rejected: stats.rejected,
        }
    }
}

/// Query parameters for the activity feed.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RecentActivityQuery {
    /// Number of entries (default: 10, max: 50).
    #[param(minimum = 1, maximum = 50)]
    pub limit: Option<usize>,
}

/// One entry of the recent activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntryResponse {
    /// Request ID.
    pub id: String,

    /// "request" for pending requests, otherwise the decision.
    #[serde(rename = "type")]
    pub kind: String,

    /// Requester's full name.
    pub user: String,

    pub details: String,

    pub timestamp: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityEntryResponse {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id.into_inner(),
            kind: entry.kind.as_str().to_string(),
            user: entry.user,
            details: entry.details,
            timestamp: entry.timestamp,
        }
    }
}
