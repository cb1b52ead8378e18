//! Authenticated principal and role resolution.
//!
//! A bearer token is resolved into a [`Principal`] exactly once, at the
//! edge. Everything downstream checks [`Principal::role`] instead of
//! comparing raw email addresses.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::JwtClaims;
use crate::error::AuthError;

/// Role a principal holds for the access-request workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May submit requests and read their own.
    Requester,
    /// May additionally read every request and decide pending ones.
    Approver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Requester => write!(f, "requester"),
            Role::Approver => write!(f, "approver"),
        }
    }
}

/// The authenticated caller of a workflow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            name: None,
            role,
        }
    }

    #[must_use]
    pub fn is_approver(&self) -> bool {
        self.role == Role::Approver
    }

    /// Whether `email` names this principal (case-insensitive).
    #[must_use]
    pub fn is_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// Decides which [`Role`] a set of verified claims maps to.
///
/// A principal is an approver when the token carries the configured
/// approver role, or when its email is on the configured approver list.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    approver_role: String,
    approver_emails: HashSet<String>,
}

impl RolePolicy {
    pub fn new(approver_role: impl Into<String>) -> Self {
        Self {
            approver_role: approver_role.into(),
            approver_emails: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_approver_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.approver_emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Resolve verified claims into a principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingClaim("email")` when the token carries no
    /// usable email address.
    pub fn resolve(&self, claims: &JwtClaims) -> Result<Principal, AuthError> {
        let email = claims
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::MissingClaim("email".to_string()))?;

        let role = if claims.has_role(&self.approver_role)
            || self.approver_emails.contains(&email.to_ascii_lowercase())
        {
            Role::Approver
        } else {
            Role::Requester
        };

        Ok(Principal {
            subject: claims.sub.clone(),
            email: email.to_string(),
            name: claims.name.clone(),
            role,
        })
    }
}
