//! Request lifecycle service.
//!
//! Owns the `Pending -> Approved | Rejected` state machine. Every write is
//! committed through the store's conditional update first; notifications
//! are dispatched afterwards and cannot undo a committed transition.

use std::collections::BTreeSet;
use std::sync::Arc;

use accessflow_auth::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::catalog;
use crate::error::{GovernanceError, Result};
use crate::notification::RequestNotifier;
use crate::store::{RequestFilter, RequestStore, StatusPatch, UpdateOutcome};
use crate::types::{AccessRequest, RequestId, RequestStatus, RequestedItems, Requester};

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;
pub const MAX_ACTIVITY_LIMIT: usize = 50;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

// ============================================================================
// Domain Types
// ============================================================================

/// Input for submitting an access request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequestInput {
    pub requester: Requester,
    pub requested_items: RequestedItems,
}

/// Pagination options for list operations.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    /// Maximum number of results.
    pub limit: i64,
    /// Number of results to skip.
    pub offset: i64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl ListOptions {
    /// Clamp to `1..=MAX_PAGE_LIMIT` and a non-negative offset.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            offset: self.offset.max(0),
        }
    }
}

/// One page of access requests, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPage {
    pub items: Vec<AccessRequest>,
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
}

/// Counts of access requests by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Kind of an activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// A request still awaiting a decision.
    Request,
    Approved,
    Rejected,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl From<RequestStatus> for ActivityKind {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self::Request,
            RequestStatus::Approved => Self::Approved,
            RequestStatus::Rejected => Self::Rejected,
        }
    }
}

/// An entry of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: RequestId,
    pub kind: ActivityKind,
    pub user: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    fn from_request(request: &AccessRequest) -> Self {
        let verb = match request.status {
            RequestStatus::Pending => "Requested",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        };
        Self {
            id: request.id.clone(),
            kind: request.status.into(),
            user: request.requester.full_name.clone(),
            details: format!("{verb} access for {}", request.requester.department),
            timestamp: request.updated_at,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Service driving access requests through their lifecycle.
pub struct RequestLifecycleService {
    store: Arc<dyn RequestStore>,
    notifier: RequestNotifier,
}

impl RequestLifecycleService {
    /// Create a new lifecycle service.
    pub fn new(store: Arc<dyn RequestStore>, notifier: RequestNotifier) -> Self {
        Self { store, notifier }
    }

    /// Submit a new access request.
    ///
    /// Validates the requester and the selection against the catalog,
    /// persists a `Pending` record, then notifies. Nothing is persisted
    /// when validation fails.
    ///
    /// A requester may only file under their own email address; approvers
    /// may file on behalf of anyone.
    pub async fn submit(
        &self,
        principal: &Principal,
        input: SubmitRequestInput,
    ) -> Result<AccessRequest> {
        let requester = normalize_requester(input.requester)?;
        require_own_email(principal, &requester.email)?;
        validate_selection(&input.requested_items)?;

        let request = AccessRequest::new_pending(requester, input.requested_items);
        self.store.insert(&request).await?;

        info!(
            target: "request_lifecycle",
            request_id = %request.id,
            submitted_by = %principal.email,
            requester = %request.requester.email,
            items = request.requested_items.len(),
            "Access request submitted"
        );

        self.notifier.dispatch_submitted(&request).await;
        Ok(request)
    }

    /// Approve a pending request, granting the requested subset of
    /// `approved_items`.
    ///
    /// Items that were never requested are dropped. An empty grant is a
    /// valid approval that grants nothing.
    pub async fn approve(
        &self,
        principal: &Principal,
        id: &RequestId,
        approved_items: BTreeSet<String>,
    ) -> Result<AccessRequest> {
        require_approver(principal, "approve", id)?;

        let current = self.load_decidable(id, RequestStatus::Approved).await?;
        let requested = current.requested_items.union();
        let granted: BTreeSet<String> = approved_items
            .into_iter()
            .filter(|item| requested.contains(item))
            .collect();

        let patch = StatusPatch {
            status: RequestStatus::Approved,
            approved_items: Some(granted),
            approver: principal.email.clone(),
            updated_at: Utc::now(),
        };
        let request = self.commit_transition(id, patch).await?;

        info!(
            target: "request_lifecycle",
            request_id = %request.id,
            approver = %principal.email,
            granted = request.granted_items().len(),
            denied = request.denied_items().len(),
            "Access request approved"
        );

        self.notifier.dispatch_approved(&request).await;
        Ok(request)
    }

    /// Reject a pending request.
    pub async fn reject(&self, principal: &Principal, id: &RequestId) -> Result<AccessRequest> {
        require_approver(principal, "reject", id)?;

        self.load_decidable(id, RequestStatus::Rejected).await?;
        let patch = StatusPatch {
            status: RequestStatus::Rejected,
            approved_items: None,
            approver: principal.email.clone(),
            updated_at: Utc::now(),
        };
        let request = self.commit_transition(id, patch).await?;

        info!(
            target: "request_lifecycle",
            request_id = %request.id,
            approver = %principal.email,
            "Access request rejected"
        );

        self.notifier.dispatch_rejected(&request).await;
        Ok(request)
    }

    /// Get a request by id.
    ///
    /// Approvers see every request; anyone else only their own. Requests
    /// that are not visible are reported as not found.
    pub async fn get(&self, principal: &Principal, id: &RequestId) -> Result<AccessRequest> {
        let request = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| GovernanceError::RequestNotFound(id.clone()))?;

        if !principal.is_approver() && !request.is_owned_by(&principal.email) {
            return Err(GovernanceError::RequestNotFound(id.clone()));
        }
        Ok(request)
    }

    /// List every request matching `filter`, newest first. Approvers only.
    pub async fn list_all(
        &self,
        principal: &Principal,
        filter: RequestFilter,
        options: ListOptions,
    ) -> Result<RequestPage> {
        if !principal.is_approver() {
            return Err(forbidden(principal, "list all access requests"));
        }
        self.page(&filter, options).await
    }

    /// List the caller's own requests, newest first.
    pub async fn list_mine(
        &self,
        principal: &Principal,
        filter: RequestFilter,
        options: ListOptions,
    ) -> Result<RequestPage> {
        let filter = RequestFilter {
            requester_email: Some(principal.email.clone()),
            ..filter
        };
        self.page(&filter, options).await
    }

    /// Counts by status. Approvers only.
    pub async fn stats(&self, principal: &Principal) -> Result<RequestStats> {
        if !principal.is_approver() {
            return Err(forbidden(principal, "view request statistics"));
        }

        let requests = self.store.scan(&RequestFilter::default()).await?;
        let mut stats = RequestStats {
            total: requests.len(),
            ..Default::default()
        };
        for request in &requests {
            match request.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
        }
        Ok(stats)
    }

    /// Most recently touched requests as an activity feed. Approvers only.
    ///
    /// `limit` defaults to [`DEFAULT_ACTIVITY_LIMIT`] and is capped at
    /// [`MAX_ACTIVITY_LIMIT`].
    pub async fn recent_activity(
        &self,
        principal: &Principal,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityEntry>> {
        if !principal.is_approver() {
            return Err(forbidden(principal, "view recent activity"));
        }

        let limit = limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT);
        let mut requests = self.store.scan(&RequestFilter::default()).await?;
        requests.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id)));

        Ok(requests
            .iter()
            .take(limit)
            .map(ActivityEntry::from_request)
            .collect())
    }

    async fn page(&self, filter: &RequestFilter, options: ListOptions) -> Result<RequestPage> {
        let options = options.normalized();
        let mut requests = self.store.scan(filter).await?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = requests.len();
        let items = requests
            .into_iter()
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .collect();

        Ok(RequestPage {
            items,
            total,
            limit: options.limit,
            offset: options.offset,
        })
    }

    async fn load_decidable(&self, id: &RequestId, next: RequestStatus) -> Result<AccessRequest> {
        let request = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| GovernanceError::RequestNotFound(id.clone()))?;

        if !request.status.can_transition_to(next) {
            return Err(GovernanceError::InvalidTransition {
                id: id.clone(),
                current: request.status,
            });
        }
        Ok(request)
    }

    /// Write a transition guarded on the record still being pending.
    async fn commit_transition(&self, id: &RequestId, patch: StatusPatch) -> Result<AccessRequest> {
        match self
            .store
            .update_if_status(id, RequestStatus::Pending, patch)
            .await?
        {
            UpdateOutcome::Updated(request) => Ok(request),
            UpdateOutcome::NotFound => Err(GovernanceError::RequestNotFound(id.clone())),
            UpdateOutcome::StatusMismatch(current) => {
                warn!(
                    target: "request_lifecycle",
                    request_id = %id,
                    current = %current,
                    "Lost race deciding access request"
                );
                Err(GovernanceError::InvalidTransition {
                    id: id.clone(),
                    current,
                })
            }
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn require_approver(principal: &Principal, action: &str, id: &RequestId) -> Result<()> {
    if principal.is_approver() {
        return Ok(());
    }
    warn!(
        target: "security",
        subject = %principal.subject,
        email = %principal.email,
        request_id = %id,
        action,
        "Non-approver attempted to decide an access request"
    );
    Err(GovernanceError::Forbidden(format!(
        "approver role required to {action} access requests"
    )))
}

fn require_own_email(principal: &Principal, email: &str) -> Result<()> {
    if principal.is_approver() || principal.is_email(email) {
        return Ok(());
    }
    warn!(
        target: "security",
        subject = %principal.subject,
        email = %principal.email,
        requested_for = %email,
        "Requester attempted to file an access request for another address"
    );
    Err(GovernanceError::Forbidden(
        "access requests can only be filed for your own email address".to_string(),
    ))
}

fn forbidden(principal: &Principal, action: &str) -> GovernanceError {
    warn!(
        target: "security",
        subject = %principal.subject,
        email = %principal.email,
        action,
        "Approver-only operation denied"
    );
    GovernanceError::Forbidden(format!("approver role required to {action}"))
}

fn check_length(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(GovernanceError::Validation(format!(
            "{field} must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn normalize_requester(requester: Requester) -> Result<Requester> {
    let requester = Requester {
        email: requester.email.trim().to_string(),
        full_name: requester.full_name.trim().to_string(),
        department: requester.department,
        job_title: requester.job_title.trim().to_string(),
    };

    if !requester.email.validate_email() {
        return Err(GovernanceError::InvalidEmail(requester.email));
    }
    check_length("full_name", &requester.full_name)?;
    check_length("job_title", &requester.job_title)?;
    Ok(requester)
}

fn validate_selection(items: &RequestedItems) -> Result<()> {
    if items.is_empty() {
        return Err(GovernanceError::EmptySelection);
    }
    for (category, selected) in items.iter() {
        if let Some(unknown) = selected.iter().find(|i| !catalog::contains(category, i)) {
            return Err(GovernanceError::UnknownCatalogItem {
                category,
                item: unknown.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{InMemoryChatSender, InMemoryEmailSender};
    use crate::store::InMemoryRequestStore;
    use crate::types::Department;
    use accessflow_auth::Role;
    use async_trait::async_trait;

    struct TestContext {
        service: Arc<RequestLifecycleService>,
        store: InMemoryRequestStore,
        email: Arc<InMemoryEmailSender>,
        chat: Arc<InMemoryChatSender>,
    }

    fn create_test_service() -> TestContext {
        build_context(
            Arc::new(InMemoryEmailSender::new()),
            Arc::new(InMemoryChatSender::new()),
        )
    }

    fn build_context(email: Arc<InMemoryEmailSender>, chat: Arc<InMemoryChatSender>) -> TestContext {
        let store = InMemoryRequestStore::new();
        let notifier = RequestNotifier::new(email.clone(), chat.clone())
            .with_admin_email(Some("it-admin@example.com".into()));
        let service = Arc::new(RequestLifecycleService::new(
            Arc::new(store.clone()),
            notifier,
        ));
        TestContext {
            service,
            store,
            email,
            chat,
        }
    }

    fn requester_principal() -> Principal {
        Principal::new("user-ama", "ama@example.com", Role::Requester)
    }

    fn other_principal() -> Principal {
        Principal::new("user-kofi", "kofi@example.com", Role::Requester)
    }

    fn approver_principal() -> Principal {
        Principal::new("user-lead", "lead@example.com", Role::Approver)
    }

    fn requester() -> Requester {
        Requester {
            email: "ama@example.com".into(),
            full_name: "Ama Mensah".into(),
            department: Department::Engineering,
            job_title: "Backend Engineer".into(),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn input(items: RequestedItems) -> SubmitRequestInput {
        SubmitRequestInput {
            requester: requester(),
            requested_items: items,
        }
    }

    fn main_cloud(items: &[&str]) -> RequestedItems {
        RequestedItems {
            main_cloud: set(items),
            ..Default::default()
        }
    }

    async fn submit(ctx: &TestContext, items: RequestedItems) -> AccessRequest {
        ctx.service
            .submit(&requester_principal(), input(items))
            .await
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Submit
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_then_get_returns_pending_record() {
        let ctx = create_test_service();
        let items = RequestedItems {
            main_cloud: set(&["core-payment"]),
            search_index: set(&["graylog-es", "ml-es"]),
            ..Default::default()
        };

        let created = submit(&ctx, items.clone()).await;
        let loaded = ctx
            .service
            .get(&requester_principal(), &created.id)
            .await
            .unwrap();

        assert_eq!(loaded.status, RequestStatus::Pending);
        assert_eq!(loaded.requested_items, items);
        assert!(loaded.approved_items.is_none());
        assert!(loaded.approver.is_none());
        assert_eq!(loaded.created_at, loaded.updated_at);
    }

    #[tokio::test]
    async fn test_submit_notifies_requester_admin_and_chat() {
        let ctx = create_test_service();
        submit(&ctx, main_cloud(&["vortex"])).await;

        let recipients: Vec<String> = ctx.email.sent().await.into_iter().map(|m| m.to).collect();
        assert_eq!(recipients, vec!["ama@example.com", "it-admin@example.com"]);
        assert_eq!(ctx.chat.posted().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_empty_selection_persists_nothing() {
        let ctx = create_test_service();
        let result = ctx
            .service
            .submit(&requester_principal(), input(RequestedItems::default()))
            .await;

        assert!(matches!(result, Err(GovernanceError::EmptySelection)));
        assert!(ctx.store.is_empty().await);
        assert!(ctx.email.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_unknown_item_rejected() {
        let ctx = create_test_service();
        let items = RequestedItems {
            gov_cloud: set(&["logging", "core-payment"]),
            ..Default::default()
        };

        let result = ctx.service.submit(&requester_principal(), input(items)).await;
        match result {
            Err(GovernanceError::UnknownCatalogItem { category, item }) => {
                assert_eq!(category, crate::types::Category::GovCloud);
                assert_eq!(item, "core-payment");
            }
            other => panic!("expected UnknownCatalogItem, got {other:?}"),
        }
        assert!(ctx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_submit_invalid_email_rejected() {
        let ctx = create_test_service();
        let mut submission = input(main_cloud(&["vortex"]));
        submission.requester.email = "not-an-email".into();

        let result = ctx.service.submit(&requester_principal(), submission).await;
        assert!(matches!(result, Err(GovernanceError::InvalidEmail(_))));
        assert!(ctx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_submit_name_and_title_length_bounds() {
        let ctx = create_test_service();

        let mut short_name = input(main_cloud(&["vortex"]));
        short_name.requester.full_name = "A".into();
        assert!(matches!(
            ctx.service.submit(&requester_principal(), short_name).await,
            Err(GovernanceError::Validation(_))
        ));

        let mut long_title = input(main_cloud(&["vortex"]));
        long_title.requester.job_title = "x".repeat(51);
        assert!(matches!(
            ctx.service.submit(&requester_principal(), long_title).await,
            Err(GovernanceError::Validation(_))
        ));

        let mut edge = input(main_cloud(&["vortex"]));
        edge.requester.full_name = "Al".into();
        edge.requester.job_title = "x".repeat(50);
        assert!(ctx.service.submit(&requester_principal(), edge).await.is_ok());
        assert_eq!(ctx.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_submit_for_another_address_forbidden() {
        let ctx = create_test_service();

        let result = ctx
            .service
            .submit(&other_principal(), input(main_cloud(&["vortex"])))
            .await;

        assert!(matches!(result, Err(GovernanceError::Forbidden(_))));
        assert!(ctx.store.is_empty().await);
        assert!(ctx.email.sent().await.is_empty());
        let ama = ctx
            .service
            .list_mine(
                &requester_principal(),
                RequestFilter::default(),
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(ama.total, 0);
    }

    #[tokio::test]
    async fn test_submit_own_address_ignores_case() {
        let ctx = create_test_service();
        let mut submission = input(main_cloud(&["vortex"]));
        submission.requester.email = "Ama@Example.com".into();

        assert!(ctx.service.submit(&requester_principal(), submission).await.is_ok());
    }

    #[tokio::test]
    async fn test_approver_may_submit_on_behalf_of_requester() {
        let ctx = create_test_service();

        let created = ctx
            .service
            .submit(&approver_principal(), input(main_cloud(&["vortex"])))
            .await
            .unwrap();

        assert_eq!(created.requester.email, "ama@example.com");
        let mine = ctx
            .service
            .list_mine(
                &requester_principal(),
                RequestFilter::default(),
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(mine.total, 1);
    }

    #[tokio::test]
    async fn test_submit_trims_requester_fields() {
        let ctx = create_test_service();
        let mut submission = input(main_cloud(&["vortex"]));
        submission.requester.full_name = "  Ama Mensah  ".into();

        let created = ctx
            .service
            .submit(&requester_principal(), submission)
            .await
            .unwrap();
        assert_eq!(created.requester.full_name, "Ama Mensah");
    }

    // ------------------------------------------------------------------
    // Approve
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_approve_clamps_to_requested_items() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["core-payment"])).await;

        let approved = ctx
            .service
            .approve(
                &approver_principal(),
                &created.id,
                set(&["core-payment", "nonexistent-item"]),
            )
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.approved_items, Some(set(&["core-payment"])));
        assert!(approved.denied_items().is_empty());
        assert_eq!(approved.approver.as_deref(), Some("lead@example.com"));

        let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.approved_items, Some(set(&["core-payment"])));
    }

    #[tokio::test]
    async fn test_approve_partial_grant_derives_denied_items() {
        let ctx = create_test_service();
        let created = submit(
            &ctx,
            RequestedItems {
                main_cloud: set(&["core-payment", "vortex"]),
                other: set(&["metabase"]),
                ..Default::default()
            },
        )
        .await;

        let approved = ctx
            .service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await
            .unwrap();

        assert_eq!(approved.granted_items(), set(&["vortex"]));
        assert_eq!(approved.denied_items(), set(&["core-payment", "metabase"]));
        assert!(approved.updated_at >= approved.created_at);
    }

    #[tokio::test]
    async fn test_approve_empty_grant_is_valid() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["vortex"])).await;

        let approved = ctx
            .service
            .approve(&approver_principal(), &created.id, BTreeSet::new())
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.approved_items, Some(BTreeSet::new()));
        assert_eq!(approved.denied_items(), set(&["vortex"]));
    }

    #[tokio::test]
    async fn test_approve_twice_conflicts_and_keeps_first_decision() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["core-payment", "vortex"])).await;

        ctx.service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await
            .unwrap();
        let second = ctx
            .service
            .approve(&approver_principal(), &created.id, set(&["core-payment"]))
            .await;

        assert!(matches!(
            second,
            Err(GovernanceError::InvalidTransition {
                current: RequestStatus::Approved,
                ..
            })
        ));
        let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.approved_items, Some(set(&["vortex"])));
    }

    #[tokio::test]
    async fn test_approve_missing_request_not_found() {
        let ctx = create_test_service();
        let result = ctx
            .service
            .approve(&approver_principal(), &RequestId::from("missing"), set(&["vortex"]))
            .await;
        assert!(matches!(result, Err(GovernanceError::RequestNotFound(_))));
    }

    #[tokio::test]
    async fn test_non_approver_cannot_approve_or_reject() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["vortex"])).await;

        let approve = ctx
            .service
            .approve(&requester_principal(), &created.id, set(&["vortex"]))
            .await;
        assert!(matches!(approve, Err(GovernanceError::Forbidden(_))));

        let reject = ctx.service.reject(&requester_principal(), &created.id).await;
        assert!(matches!(reject, Err(GovernanceError::Forbidden(_))));

        let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approve_notifies_requester_and_chat() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["core-payment", "vortex"])).await;

        ctx.service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await
            .unwrap();

        let sent = ctx.email.sent().await;
        let decision = sent.last().unwrap();
        assert_eq!(decision.to, "ama@example.com");
        assert!(decision.body.contains("Granted:\n- Vortex"));
        assert!(decision.body.contains("Not granted:\n- Core Payment"));
        assert_eq!(ctx.chat.posted().await.last().unwrap().title, "Access Request Approved");
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_approve() {
        let ctx = build_context(
            Arc::new(InMemoryEmailSender::failing()),
            Arc::new(InMemoryChatSender::failing()),
        );
        let created = submit(&ctx, main_cloud(&["vortex"])).await;

        let approved = ctx
            .service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    // ------------------------------------------------------------------
    // Reject
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_reject_pending_request() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["vortex"])).await;

        let rejected = ctx
            .service
            .reject(&approver_principal(), &created.id)
            .await
            .unwrap();

        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert!(rejected.approved_items.is_none());
        assert_eq!(rejected.approver.as_deref(), Some("lead@example.com"));

        let decision = ctx.email.sent().await.last().cloned().unwrap();
        assert_eq!(decision.subject, "Your access request has been rejected");
    }

    #[tokio::test]
    async fn test_reject_on_approved_conflicts() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["vortex"])).await;
        ctx.service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await
            .unwrap();

        let result = ctx.service.reject(&approver_principal(), &created.id).await;

        assert!(matches!(
            result,
            Err(GovernanceError::InvalidTransition { .. })
        ));
        let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_missing_request_not_found() {
        let ctx = create_test_service();
        let result = ctx
            .service
            .reject(&approver_principal(), &RequestId::from("missing"))
            .await;
        assert!(matches!(result, Err(GovernanceError::RequestNotFound(_))));
    }

    // ------------------------------------------------------------------
    // Concurrency
    // ------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_approve_and_reject_single_winner() {
        for _ in 0..20 {
            let ctx = create_test_service();
            let created = submit(&ctx, main_cloud(&["vortex"])).await;

            let approve = {
                let service = ctx.service.clone();
                let id = created.id.clone();
                tokio::spawn(async move {
                    service
                        .approve(&approver_principal(), &id, set(&["vortex"]))
                        .await
                })
            };
            let reject = {
                let service = ctx.service.clone();
                let id = created.id.clone();
                tokio::spawn(async move { service.reject(&approver_principal(), &id).await })
            };

            let approve = approve.await.unwrap();
            let reject = reject.await.unwrap();

            assert!(approve.is_ok() ^ reject.is_ok(), "exactly one decision must win");
            let loser = if approve.is_ok() { reject } else { approve };
            assert!(matches!(loser, Err(GovernanceError::InvalidTransition { .. })));

            let stored = ctx.store.get(&created.id).await.unwrap().unwrap();
            assert!(stored.status.is_terminal());
        }
    }

    /// Store that reports a status race on the conditional write, as if
    /// another approver committed between the read and the update.
    struct RacingStore {
        inner: InMemoryRequestStore,
    }

    #[async_trait]
    impl RequestStore for RacingStore {
        async fn insert(&self, request: &AccessRequest) -> Result<()> {
            self.inner.insert(request).await
        }

        async fn get(&self, id: &RequestId) -> Result<Option<AccessRequest>> {
            self.inner.get(id).await
        }

        async fn update_if_status(
            &self,
            _id: &RequestId,
            _expected: RequestStatus,
            _patch: StatusPatch,
        ) -> Result<UpdateOutcome> {
            Ok(UpdateOutcome::StatusMismatch(RequestStatus::Rejected))
        }

        async fn scan(&self, filter: &RequestFilter) -> Result<Vec<AccessRequest>> {
            self.inner.scan(filter).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_reports_conflict_without_notifying() {
        let inner = InMemoryRequestStore::new();
        let email = Arc::new(InMemoryEmailSender::new());
        let chat = Arc::new(InMemoryChatSender::new());
        let service = RequestLifecycleService::new(
            Arc::new(RacingStore {
                inner: inner.clone(),
            }),
            RequestNotifier::new(email.clone(), chat.clone()),
        );
        let created = service
            .submit(&requester_principal(), input(main_cloud(&["vortex"])))
            .await
            .unwrap();
        let emails_after_submit = email.sent().await.len();

        let result = service
            .approve(&approver_principal(), &created.id, set(&["vortex"]))
            .await;

        assert!(matches!(
            result,
            Err(GovernanceError::InvalidTransition {
                current: RequestStatus::Rejected,
                ..
            })
        ));
        assert_eq!(email.sent().await.len(), emails_after_submit);
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_hides_other_peoples_requests() {
        let ctx = create_test_service();
        let created = submit(&ctx, main_cloud(&["vortex"])).await;

        let result = ctx.service.get(&other_principal(), &created.id).await;
        assert!(matches!(result, Err(GovernanceError::RequestNotFound(_))));

        assert!(ctx.service.get(&approver_principal(), &created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_all_sorted_newest_first_and_paginated() {
        let ctx = create_test_service();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(submit(&ctx, main_cloud(&["vortex"])).await.id);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let page = ctx
            .service
            .list_all(
                &approver_principal(),
                RequestFilter::default(),
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        let listed: Vec<_> = page.items.iter().map(|r| r.id.clone()).collect();
        assert_eq!(listed, vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);

        let second = ctx
            .service
            .list_all(
                &approver_principal(),
                RequestFilter::default(),
                ListOptions { limit: 1, offset: 1 },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, ids[1]);
        assert_eq!(second.total, 3);
    }

    #[tokio::test]
    async fn test_list_all_requires_approver() {
        let ctx = create_test_service();
        let result = ctx
            .service
            .list_all(
                &requester_principal(),
                RequestFilter::default(),
                ListOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(GovernanceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_all_filters_by_status() {
        let ctx = create_test_service();
        let first = submit(&ctx, main_cloud(&["vortex"])).await;
        submit(&ctx, main_cloud(&["hubtel"])).await;
        ctx.service
            .reject(&approver_principal(), &first.id)
            .await
            .unwrap();

        let page = ctx
            .service
            .list_all(
                &approver_principal(),
                RequestFilter {
                    status: Some(RequestStatus::Pending),
                    ..Default::default()
                },
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_list_options_normalized() {
        let options = ListOptions {
            limit: 1_000,
            offset: -5,
        }
        .normalized();
        assert_eq!(options.limit, MAX_PAGE_LIMIT);
        assert_eq!(options.offset, 0);

        assert_eq!(ListOptions { limit: 0, offset: 0 }.normalized().limit, 1);
    }

    #[tokio::test]
    async fn test_list_mine_only_returns_own_requests() {
        let ctx = create_test_service();
        submit(&ctx, main_cloud(&["vortex"])).await;

        let mine = ctx
            .service
            .list_mine(
                &requester_principal(),
                RequestFilter::default(),
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(mine.total, 1);

        let theirs = ctx
            .service
            .list_mine(
                &other_principal(),
                RequestFilter {
                    requester_email: Some("ama@example.com".into()),
                    ..Default::default()
                },
                ListOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(theirs.total, 0);
    }

    #[tokio::test]
    async fn test_stats_counts_by_status() {
        let ctx = create_test_service();
        let a = submit(&ctx, main_cloud(&["vortex"])).await;
        let b = submit(&ctx, main_cloud(&["hubtel"])).await;
        submit(&ctx, main_cloud(&["ai-labs"])).await;
        ctx.service
            .approve(&approver_principal(), &a.id, set(&["vortex"]))
            .await
            .unwrap();
        ctx.service.reject(&approver_principal(), &b.id).await.unwrap();

        let stats = ctx.service.stats(&approver_principal()).await.unwrap();
        assert_eq!(
            stats,
            RequestStats {
                total: 3,
                pending: 1,
                approved: 1,
                rejected: 1,
            }
        );

        assert!(matches!(
            ctx.service.stats(&requester_principal()).await,
            Err(GovernanceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_recent_activity_entries() {
        let ctx = create_test_service();
        let first = submit(&ctx, main_cloud(&["vortex"])).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        submit(&ctx, main_cloud(&["hubtel"])).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        ctx.service
            .approve(&approver_principal(), &first.id, set(&["vortex"]))
            .await
            .unwrap();

        let activity = ctx
            .service
            .recent_activity(&approver_principal(), None)
            .await
            .unwrap();

        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].id, first.id);
        assert_eq!(activity[0].kind, ActivityKind::Approved);
        assert_eq!(activity[0].details, "Approved access for Engineering");
        assert_eq!(activity[0].user, "Ama Mensah");
        assert_eq!(activity[1].kind, ActivityKind::Request);
        assert_eq!(activity[1].details, "Requested access for Engineering");

        let limited = ctx
            .service
            .recent_activity(&approver_principal(), Some(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
