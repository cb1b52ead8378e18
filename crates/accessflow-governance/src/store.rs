//! Record store seam for access requests.
//!
//! The store is a plain keyed record store: put, get, a conditional status
//! update and an unordered scan. Ordering and pagination happen in the
//! lifecycle service at read time.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{GovernanceError, Result};
use crate::types::{AccessRequest, Department, RequestId, RequestStatus};

// ============================================================================
// Store Types
// ============================================================================

/// Filter options for scanning access requests.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Filter by status.
    pub status: Option<RequestStatus>,
    /// Filter by department.
    pub department: Option<Department>,
    /// Only requests for this requester email (case-insensitive).
    pub requester_email: Option<String>,
    /// Case-insensitive substring match on name, email or department.
    pub search: Option<String>,
}

impl RequestFilter {
    /// Whether `request` passes every set criterion.
    pub fn matches(&self, request: &AccessRequest) -> bool {
        self.status.is_none_or(|s| request.status == s)
            && self
                .department
                .is_none_or(|d| request.requester.department == d)
            && self
                .requester_email
                .as_ref()
                .is_none_or(|email| request.is_owned_by(email))
            && self.search.as_ref().is_none_or(|term| {
                let term = term.to_lowercase();
                let requester = &request.requester;
                requester.full_name.to_lowercase().contains(&term)
                    || requester.email.to_lowercase().contains(&term)
                    || requester
                        .department
                        .as_str()
                        .to_lowercase()
                        .contains(&term)
            })
    }
}

/// Fields written by a status transition.
#[derive(Debug, Clone)]
pub struct StatusPatch {
    pub status: RequestStatus,
    pub approved_items: Option<BTreeSet<String>>,
    pub approver: String,
    pub updated_at: DateTime<Utc>,
}

/// Result of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The guard held and the patch was applied.
    Updated(AccessRequest),
    /// No record with that id.
    NotFound,
    /// The record exists but its status was not the expected one.
    StatusMismatch(RequestStatus),
}

// ============================================================================
// Store Trait
// ============================================================================

/// Trait for access request storage backends.
#[async_trait::async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, request: &AccessRequest) -> Result<()>;

    /// Get a record by id.
    async fn get(&self, id: &RequestId) -> Result<Option<AccessRequest>>;

    /// Apply `patch` only if the record's current status is `expected`.
    ///
    /// The check and the write are atomic with respect to other calls.
    async fn update_if_status(
        &self,
        id: &RequestId,
        expected: RequestStatus,
        patch: StatusPatch,
    ) -> Result<UpdateOutcome>;

    /// Return every record matching `filter`, in no particular order.
    async fn scan(&self, filter: &RequestFilter) -> Result<Vec<AccessRequest>>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory request store.
///
/// Used for tests and for running the service without a database.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<RequestId, AccessRequest>>>,
}

impl InMemoryRequestStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn insert(&self, request: &AccessRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(GovernanceError::Store(format!(
                "duplicate request id {}",
                request.id
            )));
        }
        requests.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn get(&self, id: &RequestId) -> Result<Option<AccessRequest>> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn update_if_status(
        &self,
        id: &RequestId,
        expected: RequestStatus,
        patch: StatusPatch,
    ) -> Result<UpdateOutcome> {
        let mut requests = self.requests.write().await;

        let Some(request) = requests.get_mut(id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if request.status != expected {
            return Ok(UpdateOutcome::StatusMismatch(request.status));
        }

        request.status = patch.status;
        request.approved_items = patch.approved_items;
        request.approver = Some(patch.approver);
        request.updated_at = patch.updated_at;

        Ok(UpdateOutcome::Updated(request.clone()))
    }

    async fn scan(&self, filter: &RequestFilter) -> Result<Vec<AccessRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}
