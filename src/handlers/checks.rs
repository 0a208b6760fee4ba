use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{CheckReport, CheckStatus, DocumentCheckRequest};
use crate::services::run_checks;
use crate::state::SharedState;

/// `POST /api/checks`
///
/// The document id is looked up for logging only; unknown ids still get a
/// report.
pub async fn checks_handler(
    State(state): State<SharedState>,
    payload: Result<Json<DocumentCheckRequest>, JsonRejection>,
) -> AppResult<Json<CheckReport>> {
    let Json(request) = payload?;

    match state.config.document_path(&request.document_id) {
        Some(path) => info!(
            document_id = %request.document_id,
            path = %path.display(),
            "Running document checks"
        ),
        None => warn!(
            document_id = %request.document_id,
            "Unknown document id, running checks anyway"
        ),
    }

    let report = run_checks(&mut rand::thread_rng());

    let failed = report
        .items()
        .filter(|item| item.status == CheckStatus::Fail)
        .count();
    info!(
        document_id = %request.document_id,
        sections = report.sections.len(),
        failed,
        "Document checks completed"
    );

    Ok(Json(report))
}
