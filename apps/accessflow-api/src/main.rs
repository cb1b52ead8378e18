//! accessflow API server.

use std::net::SocketAddr;
use std::sync::Arc;

use accessflow_api::app::{auth_settings, build_notifier, build_router};
use accessflow_api::config::Config;
use accessflow_api::logging;
use accessflow_api::state::AppState;
use accessflow_db::{run_migrations, DbPool, PgRequestStore};
use accessflow_governance::{InMemoryRequestStore, RequestLifecycleService, RequestStore};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() {
    // Fail fast on malformed configuration.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting accessflow API"
    );

    match config.validate_security_config() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::warn!(target: "security", "{}", warning);
            }
            if !warnings.is_empty() {
                tracing::warn!(
                    target: "security",
                    count = warnings.len(),
                    "Insecure default values detected (allowed in {} mode)",
                    config.app_env
                );
            }
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "security", "{}", error);
            }
            eprintln!(
                "FATAL: {} insecure setting(s) detected in production mode. \
                 Fix the configuration or use APP_ENV=development.",
                errors.len()
            );
            std::process::exit(1);
        }
    }

    let (db, store): (Option<DbPool>, Arc<dyn RequestStore>) = match &config.database_url {
        Some(url) => {
            let pool = match DbPool::connect(url).await {
                Ok(pool) => {
                    info!("Database connection established");
                    pool
                }
                Err(e) => {
                    eprintln!("Failed to connect to database: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = run_migrations(&pool).await {
                eprintln!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }
            let store: Arc<dyn RequestStore> = Arc::new(PgRequestStore::new(&pool));
            (Some(pool), store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory request store");
            let store: Arc<dyn RequestStore> = Arc::new(InMemoryRequestStore::new());
            (None, store)
        }
    };

    let notifier = match build_notifier(&config) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Invalid notification configuration: {e}");
            std::process::exit(1);
        }
    };

    let lifecycle = Arc::new(RequestLifecycleService::new(store, notifier));
    let state = AppState::new(db);
    let shutdown_state = state.clone();

    let app = build_router(state, lifecycle, auth_settings(&config), &config.cors_origins);

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_state))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Wait for Ctrl+C or SIGTERM, then flag the state as shutting down so
/// the health endpoint reports 503 while connections drain.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    state.mark_shutting_down();
}
