//! JWT claims structure with standard and custom claims.
//!
//! Provides the `JwtClaims` struct containing the RFC 7519 standard claims
//! plus the identity claims accessflow relies on (`email`, `name`, `roles`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an identity-provider token.
///
/// Only `sub` and `exp` are mandatory on the wire. A token without an
/// `email` decodes fine but cannot be resolved into a principal.
///
/// # Example
///
/// ```rust
/// use accessflow_auth::JwtClaims;
///
/// let claims = JwtClaims::builder()
///     .subject("user-123")
///     .email("ama@example.com")
///     .roles(vec!["access-approver"])
///     .expires_in_secs(3600)
///     .build();
///
/// assert_eq!(claims.sub, "user-123");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject - typically the user ID.
    pub sub: String,

    /// Issuer - who created the token.
    #[serde(default)]
    pub iss: String,

    /// Audience - intended recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aud: Vec<String>,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    #[serde(default)]
    pub iat: i64,

    /// JWT ID - unique identifier for this token.
    #[serde(default)]
    pub jti: String,

    /// User email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User roles for authorization.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl JwtClaims {
    /// Create a new builder for constructing JWT claims.
    #[must_use]
    pub fn builder() -> JwtClaimsBuilder {
        JwtClaimsBuilder::default()
    }

    /// Check if the claims contain a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Builder for constructing JWT claims.
#[derive(Debug, Default)]
pub struct JwtClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    aud: Vec<String>,
    exp: Option<i64>,
    email: Option<String>,
    roles: Vec<String>,
}

impl JwtClaimsBuilder {
    /// Set the subject (user ID).
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the audience.
    #[must_use]
    pub fn audience(mut self, aud: Vec<impl Into<String>>) -> Self {
        self.aud = aud.into_iter().map(Into::into).collect();
        self
    }

    /// Set expiration time as Unix timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set expiration time as seconds from now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some(Utc::now().timestamp() + secs);
        self
    }

    /// Set the email claim.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the roles.
    #[must_use]
    pub fn roles(mut self, roles: Vec<impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Build the claims, issued now with a fresh `jti`. Expiry defaults to
    /// one hour.
    #[must_use]
    pub fn build(self) -> JwtClaims {
        let now = Utc::now().timestamp();
        JwtClaims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_default(),
            aud: self.aud,
            exp: self.exp.unwrap_or(now + 3600),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            email: self.email,
            name: None,
            roles: self.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let claims = JwtClaims::builder().subject("user-1").build();

        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
        assert!(claims.roles.is_empty());
        assert!(claims.name.is_none());
    }

    #[test]
    fn test_has_role() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .roles(vec!["access-approver", "staff"])
            .build();

        assert!(claims.has_role("access-approver"));
        assert!(!claims.has_role("admin"));
    }

    #[test]
    fn test_identity_claims_from_provider_token() {
        let json = r#"{"sub":"u","exp":4102444800,"email":"ama@example.com","name":"Ama Mensah","roles":["staff"]}"#;
        let claims: JwtClaims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.email.as_deref(), Some("ama@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Ama Mensah"));
        assert!(claims.has_role("staff"));
    }

    #[test]
    fn test_roles_default_when_absent() {
        let json = r#"{"sub":"u","exp":4102444800}"#;
        let claims: JwtClaims = serde_json::from_str(json).unwrap();

        assert!(claims.roles.is_empty());
        assert!(claims.email.is_none());
        assert!(claims.iss.is_empty());
    }
}
