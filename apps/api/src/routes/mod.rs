pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::parser::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handlers::handle_index))
        .route("/upload", post(handlers::handle_upload))
        // Resumes are small; 20 MiB leaves room for scanned PDFs.
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .with_state(state)
}
