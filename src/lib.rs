//! Pagecheck PDF Page Service
//!
//! Serves page counts and single-page extracts of a configured PDF, plus a
//! placeholder document-checks report.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::{AppState, SharedState};
