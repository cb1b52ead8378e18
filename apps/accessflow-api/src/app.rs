//! Application assembly: senders, auth settings, CORS and the router.

use std::sync::Arc;
use std::time::Duration;

use accessflow_api_requests::{requests_router, AuthSettings};
use accessflow_auth::{RolePolicy, ValidationConfig};
use accessflow_governance::{
    ChatSender, EmailSender, NotificationResult, RequestLifecycleService, RequestNotifier,
};
use accessflow_notify::{DisabledChatSender, DisabledEmailSender, HttpEmailSender, WebhookChatSender};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::health::health_handler;
use crate::openapi::openapi_routes;
use crate::state::AppState;

/// Build the notifier from the configured channels.
///
/// Unconfigured channels get a disabled sender.
///
/// # Errors
///
/// Returns `NotificationError::Configuration` if a configured channel has
/// unusable settings.
pub fn build_notifier(config: &Config) -> NotificationResult<RequestNotifier> {
    let email: Arc<dyn EmailSender> = match &config.mail {
        Some(mail) => {
            info!(domain = %mail.domain, "Email notifications enabled");
            Arc::new(HttpEmailSender::new(mail.clone())?)
        }
        None => {
            info!("Email notifications disabled");
            Arc::new(DisabledEmailSender)
        }
    };

    let chat: Arc<dyn ChatSender> = match &config.chat_webhook_url {
        Some(url) => {
            info!("Chat notifications enabled");
            Arc::new(WebhookChatSender::new(url.clone())?)
        }
        None => {
            info!("Chat notifications disabled");
            Arc::new(DisabledChatSender)
        }
    };

    Ok(RequestNotifier::new(email, chat).with_admin_email(config.admin_notify_email.clone()))
}

/// Token verification and role resolution settings.
pub fn auth_settings(config: &Config) -> AuthSettings {
    let mut validation = ValidationConfig::default();
    if let Some(issuer) = &config.jwt_issuer {
        validation = validation.issuer(issuer.clone());
    }
    if let Some(audience) = &config.jwt_audience {
        validation = validation.audience(audience.clone());
    }

    let policy = RolePolicy::new(config.approver_role.clone())
        .with_approver_emails(&config.approver_emails);

    AuthSettings::new(config.jwt_secret.as_bytes(), validation, policy)
}

/// Build the CORS layer from configured origins.
///
/// Explicit origin lists get `allow_credentials(true)`; a wildcard cannot.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.iter().any(|o| o == "*");

    let allow_origin = if is_wildcard {
        AllowOrigin::any()
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::predicate(
            move |origin: &HeaderValue, _req: &axum::http::request::Parts| {
                let is_allowed = allowed.contains(origin);
                if !is_allowed {
                    tracing::warn!(
                        target: "security",
                        event_type = "cors_rejected",
                        origin = %origin.to_str().unwrap_or("<non-utf8>"),
                        "CORS origin rejected"
                    );
                }
                is_allowed
            },
        )
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .max_age(Duration::from_secs(3600));

    if is_wildcard {
        layer.allow_methods(Any).allow_headers(Any)
    } else {
        layer
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    }
}

/// Assemble the full application router.
pub fn build_router(
    state: AppState,
    lifecycle: Arc<RequestLifecycleService>,
    auth: AuthSettings,
    cors_origins: &[String],
) -> Router {
    let server_routes = Router::new()
        .route("/health", get(health_handler))
        .merge(openapi_routes())
        .with_state(state);

    Router::new()
        .merge(server_routes)
        .merge(requests_router(lifecycle, Arc::new(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
