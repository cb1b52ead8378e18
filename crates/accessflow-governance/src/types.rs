//! Type definitions for the access request domain.
//!
//! Includes the request id newtype, status and department enums, the
//! per-category item selection and the `AccessRequest` record itself.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Types (Newtype Pattern)
// ============================================================================

/// Unique identifier for an access request.
///
/// Rendered as a time-ordered UUID v7 string, so lexical order follows
/// creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of an access request.
///
/// `Pending` is initial; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Title-case label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// Department a requester belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Infrastructure Department")]
    Infrastructure,
    #[serde(rename = "Engineering")]
    Engineering,
    #[serde(rename = "Merchant Relations")]
    MerchantRelations,
    #[serde(rename = "Direct-To-Customer")]
    DirectToCustomer,
    #[serde(rename = "User Experience & Marketing")]
    UserExperienceAndMarketing,
    #[serde(rename = "Commercial & New Markets")]
    CommercialAndNewMarkets,
    #[serde(rename = "Product & User Care")]
    ProductAndUserCare,
    #[serde(rename = "Internal Affairs")]
    InternalAffairs,
    #[serde(rename = "General Management")]
    GeneralManagement,
    #[serde(rename = "Finance")]
    Finance,
}

impl Department {
    pub const ALL: [Department; 10] = [
        Self::Infrastructure,
        Self::Engineering,
        Self::MerchantRelations,
        Self::DirectToCustomer,
        Self::UserExperienceAndMarketing,
        Self::CommercialAndNewMarkets,
        Self::ProductAndUserCare,
        Self::InternalAffairs,
        Self::GeneralManagement,
        Self::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure Department",
            Self::Engineering => "Engineering",
            Self::MerchantRelations => "Merchant Relations",
            Self::DirectToCustomer => "Direct-To-Customer",
            Self::UserExperienceAndMarketing => "User Experience & Marketing",
            Self::CommercialAndNewMarkets => "Commercial & New Markets",
            Self::ProductAndUserCare => "Product & User Care",
            Self::InternalAffairs => "Internal Affairs",
            Self::GeneralManagement => "General Management",
            Self::Finance => "Finance",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown department: {wanted}"))
    }
}

/// One of the five fixed catalog groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MainCloud,
    GovCloud,
    LogSearch,
    SearchIndex,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::MainCloud,
        Self::GovCloud,
        Self::LogSearch,
        Self::SearchIndex,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainCloud => "main_cloud",
            Self::GovCloud => "gov_cloud",
            Self::LogSearch => "log_search",
            Self::SearchIndex => "search_index",
            Self::Other => "other",
        }
    }

    /// Human-readable heading used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainCloud => "Main Cloud Accounts",
            Self::GovCloud => "Gov Cloud Accounts",
            Self::LogSearch => "Log Search",
            Self::SearchIndex => "Search Index",
            Self::Other => "Other Access",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Domain Types
// ============================================================================

/// Identity of the employee an access request is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub email: String,
    pub full_name: String,
    pub department: Department,
    pub job_title: String,
}

/// Requested item names, grouped by catalog category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedItems {
    #[serde(default)]
    pub main_cloud: BTreeSet<String>,
    #[serde(default)]
    pub gov_cloud: BTreeSet<String>,
    #[serde(default)]
    pub log_search: BTreeSet<String>,
    #[serde(default)]
    pub search_index: BTreeSet<String>,
    #[serde(default)]
    pub other: BTreeSet<String>,
}

impl RequestedItems {
    /// Items selected in `category`.
    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::MainCloud => &self.main_cloud,
            Category::GovCloud => &self.gov_cloud,
            Category::LogSearch => &self.log_search,
            Category::SearchIndex => &self.search_index,
            Category::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::MainCloud => &mut self.main_cloud,
            Category::GovCloud => &mut self.gov_cloud,
            Category::LogSearch => &mut self.log_search,
            Category::SearchIndex => &mut self.search_index,
            Category::Other => &mut self.other,
        }
    }

    /// Iterate categories in catalog order with their selections.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &BTreeSet<String>)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// True when every category is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, items)| items.is_empty())
    }

    /// Total number of selected items across categories.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, items)| items.len()).sum()
    }

    /// Flattened union of all categories.
    pub fn union(&self) -> BTreeSet<String> {
        self.iter()
            .flat_map(|(_, items)| items.iter().cloned())
            .collect()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.iter().any(|(_, items)| items.contains(item))
    }
}

/// An employee's request for access to internal systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: RequestId,
    pub requester: Requester,
    pub requested_items: RequestedItems,
    pub status: RequestStatus,
    /// Granted items; set exactly once, by an approval.
    pub approved_items: Option<BTreeSet<String>>,
    /// Email of the approver who decided the request.
    pub approver: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccessRequest {
    /// Build a new pending request with a fresh id.
    pub fn new_pending(requester: Requester, requested_items: RequestedItems) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::generate(),
            requester,
            requested_items,
            status: RequestStatus::Pending,
            approved_items: None,
            approver: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Items granted by the decision (empty unless approved).
    pub fn granted_items(&self) -> BTreeSet<String> {
        self.approved_items.clone().unwrap_or_default()
    }

    /// Requested items that were not granted.
    ///
    /// Derived on read; for a pending request nothing is denied yet.
    pub fn denied_items(&self) -> BTreeSet<String> {
        match self.status {
            RequestStatus::Pending => BTreeSet::new(),
            RequestStatus::Rejected => self.requested_items.union(),
            RequestStatus::Approved => {
                let granted = self.granted_items();
                self.requested_items
                    .union()
                    .into_iter()
                    .filter(|item| !granted.contains(item))
                    .collect()
            }
        }
    }

    /// Whether the request belongs to the given email (case-insensitive).
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.requester.email.eq_ignore_ascii_case(email)
    }
}
