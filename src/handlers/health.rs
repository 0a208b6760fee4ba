use axum::{extract::State, http::StatusCode, response::Json};
use std::time::SystemTime;
use tracing::info;

use crate::models::{HealthResponse, StatusResponse};
use crate::state::SharedState;

pub const STATUS_MESSAGE: &str =
    "PDF Page Extractor API is running. Use POST /api/extract-page to extract a specific page.";

/// `GET /api/`
pub async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

/// Health check endpoint
pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let source_file_present = state.pdf.is_available(&state.config.source_pdf_path);
    let status = if source_file_present { "healthy" } else { "degraded" };

    info!(status = status, source_file_present, "Health check completed");

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source_file_present,
        timestamp,
    })
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<SharedState>) -> StatusCode {
    if state.pdf.is_available(&state.config.source_pdf_path) {
        info!("Readiness check passed");
        StatusCode::OK
    } else {
        info!("Readiness check failed - source PDF missing");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
