//! Error types for the access request domain.

use thiserror::Error;

use crate::types::{Category, RequestId, RequestStatus};

/// Result type alias for governance operations.
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Governance domain errors.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Generic input validation failure.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requester email is not a valid address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// No item was selected in any category.
    #[error("At least one access item must be selected")]
    EmptySelection,

    /// Item is not part of its category's catalog.
    #[error("Unknown {category} item: {item}")]
    UnknownCatalogItem { category: Category, item: String },

    /// Access request does not exist (or is not visible to the caller).
    #[error("Access request not found: {0}")]
    RequestNotFound(RequestId),

    /// Access request is no longer pending.
    #[error("Access request {id} is already {current}")]
    InvalidTransition {
        id: RequestId,
        current: RequestStatus,
    },

    /// Caller lacks the role the operation requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store backend failure other than a database error.
    #[error("Store error: {0}")]
    Store(String),
}

impl GovernanceError {
    /// Check if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestNotFound(_))
    }

    /// Check if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this is a forbidden error.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidEmail(_)
                | Self::EmptySelection
                | Self::UnknownCatalogItem { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let id = RequestId::from("abc");
        assert!(GovernanceError::RequestNotFound(id.clone()).is_not_found());
        assert!(GovernanceError::InvalidTransition {
            id,
            current: RequestStatus::Approved
        }
        .is_conflict());
        assert!(GovernanceError::Forbidden("approver role required".into()).is_forbidden());
        assert!(GovernanceError::EmptySelection.is_validation());
        assert!(GovernanceError::UnknownCatalogItem {
            category: Category::GovCloud,
            item: "nope".into()
        }
        .is_validation());
        assert!(!GovernanceError::Store("down".into()).is_validation());
    }

    #[test]
    fn test_transition_message_names_current_status() {
        let err = GovernanceError::InvalidTransition {
            id: RequestId::from("r-1"),
            current: RequestStatus::Rejected,
        };
        assert_eq!(err.to_string(), "Access request r-1 is already rejected");
    }
}
