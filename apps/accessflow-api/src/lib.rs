//! accessflow server.
//!
//! Wires configuration, logging, the request store, notification senders
//! and the HTTP routers into one axum application. `main.rs` is a thin
//! shell around [`app::build_router`].

pub mod app;
pub mod config;
pub mod health;
pub mod logging;
pub mod openapi;
pub mod state;
