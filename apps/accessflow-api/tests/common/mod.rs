//! Shared helpers for server tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use accessflow_api::app::{auth_settings, build_notifier, build_router};
use accessflow_api::config::Config;
use accessflow_api::state::AppState;
use accessflow_auth::{encode_token, JwtClaims};
use accessflow_governance::{InMemoryRequestStore, RequestLifecycleService};
use axum::Router;

pub const SECRET: &str = "server-test-secret-0123456789abcdef";
pub const APPROVER: &str = "it-lead@example.com";

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("JWT_SECRET".to_string(), SECRET.to_string()),
        ("APPROVER_EMAILS".to_string(), APPROVER.to_string()),
    ]);
    for (k, v) in extra {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Full application on the in-memory store with disabled notifications.
pub fn test_app(config: &Config) -> (Router, AppState) {
    let lifecycle = Arc::new(RequestLifecycleService::new(
        Arc::new(InMemoryRequestStore::new()),
        build_notifier(config).unwrap(),
    ));
    let state = AppState::new(None);
    let router = build_router(
        state.clone(),
        lifecycle,
        auth_settings(config),
        &config.cors_origins,
    );
    (router, state)
}

pub fn token_for(email: &str, roles: &[&str]) -> String {
    let claims = JwtClaims::builder()
        .subject(format!("sub-{email}"))
        .email(email)
        .roles(roles.to_vec())
        .build();
    encode_token(&claims, SECRET.as_bytes()).unwrap()
}
