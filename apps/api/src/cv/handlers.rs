use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::cv::pipeline::{self, UploadSummary, UploadedFile};
use crate::cv::repository;
use crate::errors::AppError;
use crate::models::cv::{CvRow, CvStatus};
use crate::state::AppState;

/// Upper bound on files accepted in one upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub user_id: Uuid,
    pub status: String,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub template_id: Option<Uuid>,
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

/// POST /api/v1/cvs/upload
/// Multipart fields: `user_id`, then one or more `files`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<UploadSummary>>), AppError> {
    let mut user_id = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let raw = field.text().await.map_err(malformed)?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation(format!("Invalid user_id '{raw}'")))?;
                user_id = Some(id);
            }
            Some("files") | Some("file") => {
                if files.len() == MAX_FILES_PER_UPLOAD {
                    return Err(AppError::Validation(format!(
                        "At most {MAX_FILES_PER_UPLOAD} files per upload"
                    )));
                }
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("File part without a filename".to_string()))?;
                let bytes = field.bytes().await.map_err(malformed)?;
                files.push(UploadedFile { filename, bytes });
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let summaries = pipeline::ingest_uploads(&state, user_id, files).await?;
    Ok((StatusCode::CREATED, Json(summaries)))
}

/// GET /api/v1/cvs
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<CvRow>>, AppError> {
    let cvs = repository::list_cvs(&state.db, params.user_id).await?;
    Ok(Json(cvs))
}

/// GET /api/v1/cvs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CvRow>, AppError> {
    let cv = pipeline::load_cv(&state, id, params.user_id).await?;
    Ok(Json(cv))
}

/// POST /api/v1/cvs/:id/reparse
pub async fn handle_reparse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CvRow>, AppError> {
    let cv = pipeline::reparse(&state, id, params.user_id).await?;
    Ok(Json(cv))
}

/// PATCH /api/v1/cvs/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<StatusCode, AppError> {
    let status: CvStatus = req.status.parse().map_err(AppError::Validation)?;
    if !repository::set_status(&state.db, id, req.user_id, status).await? {
        return Err(AppError::NotFound(format!("CV {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cvs/:id/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let pdf = pipeline::generate(&state, id, req.user_id, req.template_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pdf.filename),
            ),
        ],
        pdf.bytes,
    )
        .into_response())
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    pipeline::remove(&state, id, params.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/layouts
pub async fn handle_list_layouts(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.renderer.layouts().names())
}
