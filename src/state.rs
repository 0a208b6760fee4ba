//! Shared, read-only application state

use std::sync::Arc;

use crate::config::Config;
use crate::services::PdfProcessor;

pub type SharedState = Arc<AppState>;

#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub pdf: PdfProcessor,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        tracing::info!(
            source = %config.source_pdf_path.display(),
            documents = config.document_paths.len(),
            "Initializing application state"
        );
        Self {
            config,
            pdf: PdfProcessor::new(),
        }
    }

    pub fn shared(config: Config) -> SharedState {
        Arc::new(Self::new(config))
    }
}
