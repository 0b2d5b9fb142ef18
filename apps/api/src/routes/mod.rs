pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::cv::handlers::{self, MAX_FILES_PER_UPLOAD};
use crate::state::AppState;

/// Multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes * MAX_FILES_PER_UPLOAD + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/layouts", get(handlers::handle_list_layouts))
        // CV API
        .route(
            "/api/v1/cvs/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/cvs", get(handlers::handle_list))
        .route(
            "/api/v1/cvs/:id",
            get(handlers::handle_get).delete(handlers::handle_delete),
        )
        .route("/api/v1/cvs/:id/reparse", post(handlers::handle_reparse))
        .route("/api/v1/cvs/:id/status", patch(handlers::handle_update_status))
        .route("/api/v1/cvs/:id/generate", post(handlers::handle_generate))
        .with_state(state)
}
