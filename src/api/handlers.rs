//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::summary::{
    destination_series, product_series, terminal_series, DestinationVolume, Kpis,
    ProductVolume, SummaryMetrics, TerminalVolume,
};
use crate::core::{aggregator::SkippedSheet, ComplianceReport};
use crate::error::FuelPlanError;
use crate::service::{LoadOutcome, LoadPhase, LoadResult, SnapshotStatus};
use crate::types::Terminal;

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn no_data<T: Serialize>() -> ApiResult<T> {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::err(
            "No data loaded. POST /api/v1/load to load the plan workbook.",
        )),
    )
}

/// HTTP status for a failed load
pub fn status_for(error: &FuelPlanError) -> StatusCode {
    match error {
        FuelPlanError::LoadInProgress => StatusCode::CONFLICT,
        FuelPlanError::FileNotFound(_) => StatusCode::NOT_FOUND,
        FuelPlanError::NoValidData => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Fuelplan Dashboard Server".to_string(),
        version: state.version.clone(),
        description: "Fuel distribution plan aggregation for the Pacific zone terminals"
            .to_string(),
        endpoints: vec![
            EndpointInfo::new("GET", "/health", "Health check endpoint"),
            EndpointInfo::new("GET", "/version", "Get server version"),
            EndpointInfo::new("GET", "/dashboard", "Interactive dashboard page"),
            EndpointInfo::new("POST", "/api/v1/load", "Load the plan workbook"),
            EndpointInfo::new("GET", "/api/v1/status", "State of the last load"),
            EndpointInfo::new("GET", "/api/v1/summary", "Total and per-product volumes"),
            EndpointInfo::new("GET", "/api/v1/series/terminals", "Volume per terminal by product"),
            EndpointInfo::new("GET", "/api/v1/series/products", "Volume per product"),
            EndpointInfo::new(
                "GET",
                "/api/v1/series/destinations",
                "Volume per destination (optional ?terminal=)",
            ),
            EndpointInfo::new("GET", "/api/v1/compliance", "Compliance report rows"),
            EndpointInfo::new("POST", "/api/v1/shutdown", "Stop the server"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "load".to_string(),
            "summary".to_string(),
            "series".to_string(),
            "compliance".to_string(),
            "snapshot".to_string(),
        ],
    }))
}

/// GET /dashboard - Static dashboard page rendering the series client-side
pub async fn dashboard_page() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}

/// Load response
#[derive(Serialize, Default)]
pub struct LoadResponse {
    pub loaded: bool,
    pub workbook: String,
    pub loaded_at: String,
    pub kpis: Option<Kpis>,
    pub terminals: Vec<Terminal>,
    pub skipped: Vec<SkippedSheet>,
    pub snapshot: Option<SnapshotStatus>,
}

impl LoadResponse {
    fn from_outcome(outcome: &LoadOutcome) -> Self {
        Self {
            loaded: true,
            workbook: outcome.workbook.display().to_string(),
            loaded_at: outcome.loaded_at.to_rfc3339(),
            kpis: Some(outcome.metrics.kpis()),
            terminals: outcome.report.loaded.clone(),
            skipped: outcome.report.skipped.clone(),
            snapshot: Some(outcome.snapshot.clone()),
        }
    }
}

/// POST /api/v1/load - Run a load cycle
pub async fn load(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dashboard = Arc::clone(&state.dashboard);
    let result = tokio::task::spawn_blocking(move || dashboard.reload()).await;

    match result {
        Ok(Ok(outcome)) => ok(LoadResponse::from_outcome(&outcome)),
        Ok(Err(e)) => (status_for(&e), Json(ApiResponse::err(e.to_string()))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("Load task failed: {}", e))),
        ),
    }
}

/// Status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub phase: LoadPhase,
    /// `never_loaded`, `succeeded` or `failed`
    pub last_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/v1/status - Current phase and last load result
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let phase = state.dashboard.phase();
    let response = match state.dashboard.last_result() {
        None => StatusResponse {
            phase,
            last_result: "never_loaded".to_string(),
            loaded_at: None,
            workbook: None,
            error: None,
        },
        Some(LoadResult::Succeeded(outcome)) => StatusResponse {
            phase,
            last_result: "succeeded".to_string(),
            loaded_at: Some(outcome.loaded_at.to_rfc3339()),
            workbook: Some(outcome.workbook.display().to_string()),
            error: None,
        },
        Some(LoadResult::Failed(reason)) => StatusResponse {
            phase,
            last_result: "failed".to_string(),
            loaded_at: None,
            workbook: None,
            error: Some(reason),
        },
    };
    Json(ApiResponse::ok(response))
}

/// Summary response
#[derive(Serialize)]
pub struct SummaryResponse {
    pub kpis: Kpis,
    pub metrics: SummaryMetrics,
}

/// GET /api/v1/summary - Headline numbers and roll-ups
pub async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.dashboard.latest() {
        Some(outcome) => ok(SummaryResponse {
            kpis: outcome.metrics.kpis(),
            metrics: outcome.metrics.clone(),
        }),
        None => no_data(),
    }
}

/// GET /api/v1/series/terminals
pub async fn terminals_series(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.dashboard.latest() {
        Some(outcome) => ok::<Vec<TerminalVolume>>(terminal_series(&outcome.set)),
        None => no_data(),
    }
}

/// GET /api/v1/series/products
pub async fn products_series(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.dashboard.latest() {
        Some(outcome) => ok::<Vec<ProductVolume>>(product_series(&outcome.set)),
        None => no_data(),
    }
}

/// Destination series query
#[derive(Deserialize, Default)]
pub struct DestinationQuery {
    pub terminal: Option<Terminal>,
}

/// GET /api/v1/series/destinations?terminal=Guaymas
pub async fn destinations_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DestinationQuery>,
) -> impl IntoResponse {
    match state.dashboard.latest() {
        Some(outcome) => {
            ok::<Vec<DestinationVolume>>(destination_series(&outcome.set, query.terminal))
        }
        None => no_data(),
    }
}

/// GET /api/v1/compliance
pub async fn compliance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.dashboard.latest() {
        Some(outcome) => match &outcome.compliance {
            Some(report) => ok::<ComplianceReport>(report.clone()),
            None => (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::err("No compliance report in the last load")),
            ),
        },
        None => no_data(),
    }
}

/// Shutdown response
#[derive(Serialize)]
pub struct ShutdownResponse {
    pub message: String,
}

/// POST /api/v1/shutdown - Stop serving and exit
pub async fn shutdown(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.shutdown.notify_one();
    Json(ApiResponse::ok(ShutdownResponse {
        message: "Server is shutting down".to_string(),
    }))
}
