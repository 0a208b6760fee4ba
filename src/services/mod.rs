pub mod checks;
pub mod pdf_processor;

pub use checks::run_checks;
pub use pdf_processor::{ExtractedPage, PdfProcessor};
