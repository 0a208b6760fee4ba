use serde::{Deserialize, Serialize};

/// Body of `POST /api/extract-page`. The page number is 1-based and is kept
/// signed so out-of-range values reach the bounds check instead of the JSON
/// rejection path.
#[derive(Debug, Deserialize, Serialize)]
pub struct PageRequest {
    pub page_number: i64,
}

/// Body of `POST /api/checks`.
#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentCheckRequest {
    pub document_id: String,
}
