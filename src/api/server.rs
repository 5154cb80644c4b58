//! SheetStore API server implementation
//!
//! HTTP REST API using Axum. Exposes the import dialog, the record list and
//! the spreadsheet export as JSON/binary endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::AppConfig;
use crate::controller::ImportController;
use crate::store::build_store;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl From<&AppConfig> for ApiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub backend: &'static str,
    /// One dialog per server. Never held across a store call.
    pub controller: Arc<Mutex<ImportController>>,
}

impl AppState {
    pub fn new(controller: ImportController) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: controller.backend_name(),
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

/// Build the router (used by the server and by tests)
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Import dialog
        .route("/api/v1/import", get(handlers::dialog))
        .route("/api/v1/import/open", post(handlers::open))
        .route("/api/v1/import/file", post(handlers::upload))
        .route("/api/v1/import/cancel", post(handlers::cancel))
        .route("/api/v1/import/submit", post(handlers::submit))
        // Records
        .route("/api/v1/users", get(handlers::users))
        .route("/api/v1/export", get(handlers::export))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server until Ctrl+C / SIGTERM
///
/// # Coverage Exclusion
/// Serves forever. Routing and handlers are tested through `router()`.
#[cfg(not(coverage))]
pub async fn run_api_server(config: &AppConfig) -> anyhow::Result<()> {
    let store = build_store(&config.store)?;
    let backend = store.backend_name();
    let controller = ImportController::from_config(store, config);
    let state = Arc::new(AppState::new(controller));

    let api = ApiConfig::from(config);
    let addr: SocketAddr = format!("{}:{}", api.host, api.port).parse()?;
    info!("📊 SheetStore API Server starting on http://{}", addr);
    info!(
        "   Store: {} / collection '{}'",
        backend, config.store.collection
    );
    info!("   Endpoints: /api/v1/import[/open|/file|/cancel|/submit], /api/v1/users, /api/v1/export");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SheetStore API Server shutdown complete");
    Ok(())
}

/// Stub for coverage builds
#[cfg(coverage)]
pub async fn run_api_server(_config: &AppConfig) -> anyhow::Result<()> {
    Ok(())
}

/// Graceful shutdown signal handler
#[cfg(not(coverage))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
