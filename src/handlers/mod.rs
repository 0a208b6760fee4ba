pub mod checks;
pub mod health;
pub mod pages;

pub use checks::*;
pub use health::*;
pub use pages::*;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{AppError, AppResult};
use crate::middleware::logging_middleware;
use crate::state::SharedState;

/// Only the configured origin may call the API; methods and headers are
/// mirrored since wildcards cannot be combined with credentials.
pub fn cors_layer(origin: &str) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| AppError::internal(format!("Invalid CORS origin '{}': {}", origin, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Builds the application router
pub fn create_router(state: SharedState) -> AppResult<Router> {
    let cors = cors_layer(&state.config.cors_allowed_origin)?;
    let body_limit = state.config.max_body_size_bytes();

    Ok(Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api", get(root_handler))
        .route("/api/", get(root_handler))
        .route("/api/checks", post(checks_handler))
        .route("/api/total-pages", get(total_pages_handler))
        .route("/api/extract-page", post(extract_page_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        ))
}
