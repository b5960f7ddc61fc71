//! Fuelplan API Server implementation
//!
//! HTTP server using Axum. Serves the dashboard page plus JSON endpoints
//! for load, status, summary, series and compliance data.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::config::DashboardConfig;
use crate::service::Dashboard;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Run one load cycle before accepting requests (off by default; loads
    /// normally come from `POST /api/v1/load`)
    pub load_on_start: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            load_on_start: false,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    pub dashboard: Arc<Dashboard>,
    /// Signalled by `POST /api/v1/shutdown`
    pub shutdown: Notify,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dashboard: Arc::new(dashboard),
            shutdown: Notify::new(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
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
        .route("/dashboard", get(handlers::dashboard_page))
        // Dashboard API endpoints
        .route("/api/v1/load", post(handlers::load))
        .route("/api/v1/status", get(handlers::status))
        .route("/api/v1/summary", get(handlers::summary))
        .route("/api/v1/series/terminals", get(handlers::terminals_series))
        .route("/api/v1/series/products", get(handlers::products_series))
        .route("/api/v1/series/destinations", get(handlers::destinations_series))
        .route("/api/v1/compliance", get(handlers::compliance))
        .route("/api/v1/shutdown", post(handlers::shutdown))
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, dashboard: DashboardConfig) -> anyhow::Result<()> {
    // Initialize tracing; a subscriber may already be installed by the CLI
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuelplan=info,tower_http=info".into()),
        )
        .try_init();

    let state = Arc::new(AppState::new(Dashboard::new(dashboard)));

    if config.load_on_start {
        let dashboard = Arc::clone(&state.dashboard);
        match tokio::task::spawn_blocking(move || dashboard.reload()).await? {
            Ok(outcome) => info!(
                "📦 Initial load: {} terminals from {}",
                outcome.set.len(),
                outcome.workbook.display()
            ),
            Err(e) => warn!("Initial load failed: {}", e),
        }
    }

    let app = build_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("⛽ Fuelplan Dashboard Server starting on http://{}", addr);
    info!("   Dashboard: http://{}/dashboard", addr);
    info!("   Endpoints: /api/v1/load, /api/v1/status, /api/v1/summary, /api/v1/series/*, /api/v1/compliance");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("Fuelplan Dashboard Server shutdown complete");
    Ok(())
}

/// Graceful shutdown: Ctrl+C, SIGTERM or the shutdown endpoint
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = state.shutdown.notified() => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8050);
        assert!(!config.load_on_start);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
            load_on_start: false,
        };
        let addr_str = format!("{}:{}", config.host, config.port);
        assert_eq!(addr_str, "192.168.1.100:9090");

        // Verify it parses to SocketAddr
        let addr: SocketAddr = addr_str.parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    // ==================== AppState Tests ====================

    #[test]
    fn test_app_state_version() {
        let state = AppState::new(Dashboard::new(DashboardConfig::default()));
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert!(state.dashboard.latest().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_signal_fires_on_notify() {
        let state = Arc::new(AppState::new(Dashboard::new(DashboardConfig::default())));
        // A permit stored before anyone waits is still observed
        state.shutdown.notify_one();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            shutdown_signal(Arc::clone(&state)),
        )
        .await
        .unwrap();
    }
}
