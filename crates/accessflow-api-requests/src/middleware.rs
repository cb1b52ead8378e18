//! Bearer token authentication middleware.
//!
//! Extracts and verifies the JWT from the Authorization header, resolves
//! its claims into a [`Principal`] and inserts the principal into request
//! extensions for handlers to pick up with `Extension<Principal>`.

use std::fmt;
use std::sync::Arc;

use accessflow_auth::{decode_token_with_config, Principal, RolePolicy, ValidationConfig};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiRequestsError;

/// Everything needed to turn a bearer token into a [`Principal`].
#[derive(Clone)]
pub struct AuthSettings {
    secret: Vec<u8>,
    validation: ValidationConfig,
    policy: RolePolicy,
}

impl AuthSettings {
    pub fn new(secret: impl Into<Vec<u8>>, validation: ValidationConfig, policy: RolePolicy) -> Self {
        Self {
            secret: secret.into(),
            validation,
            policy,
        }
    }

    /// Verify `token` and resolve the caller.
    pub fn authenticate(&self, token: &str) -> Result<Principal, ApiRequestsError> {
        let claims = decode_token_with_config(token, &self.secret, &self.validation)
            .map_err(|e| {
                tracing::warn!(target: "security", "JWT validation failed: {}", e);
                ApiRequestsError::Unauthorized
            })?;

        self.policy.resolve(&claims).map_err(|e| {
            tracing::warn!(target: "security", subject = %claims.sub, "Token rejected: {}", e);
            ApiRequestsError::Unauthorized
        })
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"[REDACTED]")
            .field("validation", &self.validation)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Bearer authentication middleware.
///
/// ```rust,ignore
/// let router = Router::new()
///     .route("/access-requests", get(list_requests))
///     .layer(middleware::from_fn_with_state(settings, bearer_auth_middleware));
/// ```
pub async fn bearer_auth_middleware(
    State(settings): State<Arc<AuthSettings>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiRequestsError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(ApiRequestsError::Unauthorized)?;

    if token.is_empty() {
        tracing::warn!(target: "security", "Rejected empty bearer token");
        return Err(ApiRequestsError::Unauthorized);
    }

    let principal = settings.authenticate(token)?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
