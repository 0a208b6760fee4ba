use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use tracing::{error, info};

use crate::error::AppResult;
use crate::models::{ExtractPageResponse, PageRequest, TotalPagesResponse};
use crate::state::SharedState;

/// `GET /api/total-pages`
pub async fn total_pages_handler(
    State(state): State<SharedState>,
) -> AppResult<Json<TotalPagesResponse>> {
    let path = state.config.source_pdf_path.clone();
    info!(path = %path.display(), "Counting pages");

    let total_pages = state.pdf.total_pages(path).await.map_err(|e| {
        error!(error = %e, "Failed to count pages");
        e
    })?;

    info!(total_pages, "Page count completed");
    Ok(Json(TotalPagesResponse { total_pages }))
}

/// `POST /api/extract-page`
pub async fn extract_page_handler(
    State(state): State<SharedState>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> AppResult<Json<ExtractPageResponse>> {
    let Json(request) = payload?;
    let path = state.config.source_pdf_path.clone();

    info!(
        path = %path.display(),
        page_number = request.page_number,
        "Starting page extraction request"
    );

    let page = state
        .pdf
        .extract(path, request.page_number)
        .await
        .map_err(|e| {
            error!(page_number = request.page_number, error = %e, "Page extraction failed");
            e
        })?;

    let base64_content = page.to_base64();
    info!(
        page_number = page.page_number,
        pdf_bytes = page.content.len(),
        encoded_length = base64_content.len(),
        processing_time_ms = page.processing_time_ms,
        "Page extraction completed successfully"
    );

    Ok(Json(ExtractPageResponse {
        page_number: page.page_number,
        base64_content,
    }))
}
