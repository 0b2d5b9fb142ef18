//! Upload → extract → structure → persist, and persisted CV → branded PDF.
//!
//! Extraction and structuring failures never fail an upload: the CV is stored
//! without structured data and the failure message goes on the record.
//! Storage and database failures do fail the request.

use std::future::Future;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::repository::{self, NewCv};
use crate::cv::storage;
use crate::errors::AppError;
use crate::extraction::{self, DocumentFormat};
use crate::models::cv::{CvRow, CvStatus};
use crate::models::organization::OrganizationProfile;
use crate::state::AppState;
use crate::structuring::{ResumeStructurer, StructuredResume};

/// One uploaded file, already read into memory.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Result of the parse step for one document.
#[derive(Debug)]
pub struct ParseOutcome {
    pub parsed: Option<StructuredResume>,
    pub error: Option<String>,
}

impl ParseOutcome {
    fn failed(message: String) -> Self {
        Self {
            parsed: None,
            error: Some(message),
        }
    }

    fn parsed_json(&self) -> Result<Option<serde_json::Value>, AppError> {
        self.parsed
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(e.into()))
    }
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub id: Uuid,
    pub filename: String,
    pub status: String,
    pub parsed: bool,
    pub error: Option<String>,
}

impl From<&CvRow> for UploadSummary {
    fn from(row: &CvRow) -> Self {
        Self {
            id: row.id,
            filename: row.original_filename.clone(),
            status: row.status.clone(),
            parsed: row.parsed_data.is_some(),
            error: row.parse_error.clone(),
        }
    }
}

/// Rejects a file before anything is stored.
pub fn validate_upload(file: &UploadedFile, max_bytes: usize) -> Result<DocumentFormat, AppError> {
    let format = DocumentFormat::from_filename(&file.filename)?;
    if file.bytes.is_empty() {
        return Err(AppError::Validation(format!("{} is empty", file.filename)));
    }
    if file.bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "{} is {} bytes; the limit is {max_bytes}",
            file.filename,
            file.bytes.len()
        )));
    }
    Ok(format)
}

/// Extracts and structures one document, capturing any failure as a message.
pub async fn parse_document(
    structurer: &ResumeStructurer,
    bytes: Bytes,
    extension: &str,
) -> ParseOutcome {
    let ext = extension.to_string();
    let text = match tokio::task::spawn_blocking(move || extraction::extract(&bytes, &ext)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return ParseOutcome::failed(e.to_string()),
        Err(e) => return ParseOutcome::failed(format!("extraction task failed: {e}")),
    };

    match structurer.structure(&text).await {
        Ok(resume) => ParseOutcome {
            parsed: Some(resume),
            error: None,
        },
        Err(e) => ParseOutcome::failed(e.to_string()),
    }
}

fn extension_of(filename: &str) -> &str {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// Awaits `record`; when it fails, runs `discard` before returning the error.
/// A failed `discard` is only logged.
async fn record_or_discard<T, R, D, DFut>(record: R, discard: D) -> Result<T, AppError>
where
    R: Future<Output = Result<T, AppError>>,
    D: FnOnce() -> DFut,
    DFut: Future<Output = Result<(), AppError>>,
{
    match record.await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(e) = discard().await {
                warn!("Could not discard stored original after a failed insert: {e}");
            }
            Err(err)
        }
    }
}

/// Stores, parses and records each file in order.
///
/// The original is deleted again when its record cannot be written. A
/// storage or database failure aborts the remaining files; CVs recorded
/// before it stay and their ids are logged.
pub async fn ingest_uploads(
    state: &AppState,
    user_id: Uuid,
    files: Vec<UploadedFile>,
) -> Result<Vec<UploadSummary>, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }
    let formats = files
        .iter()
        .map(|file| validate_upload(file, state.config.max_upload_bytes))
        .collect::<Result<Vec<_>, _>>()?;

    let mut summaries = Vec::with_capacity(files.len());
    for (file, format) in files.into_iter().zip(formats) {
        match ingest_one(state, user_id, file, format).await {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                if !summaries.is_empty() {
                    let kept: Vec<String> = summaries.iter().map(|s| s.id.to_string()).collect();
                    warn!("Upload for user {user_id} aborted; already recorded: {}", kept.join(", "));
                }
                return Err(e);
            }
        }
    }

    Ok(summaries)
}

async fn ingest_one(
    state: &AppState,
    user_id: Uuid,
    file: UploadedFile,
    format: DocumentFormat,
) -> Result<UploadSummary, AppError> {
    let cv_id = Uuid::new_v4();
    let extension = extension_of(&file.filename).to_lowercase();
    let key = storage::original_key(user_id, cv_id, &extension);
    let bucket = &state.config.s3_bucket;

    storage::put_original(&state.s3, bucket, &key, file.bytes.clone(), format.content_type()).await?;

    let outcome = parse_document(&state.structurer, file.bytes, &extension).await;
    if let Some(error) = &outcome.error {
        warn!("CV {cv_id} ({}) stored without structured data: {error}", file.filename);
    }

    let record = async {
        let row = repository::insert_cv(
            &state.db,
            NewCv {
                id: cv_id,
                user_id,
                original_filename: &file.filename,
                storage_key: &key,
                parsed_data: outcome.parsed_json()?,
                parse_error: outcome.error.clone(),
            },
        )
        .await?;
        Ok::<_, AppError>(row)
    };
    let row = record_or_discard(record, || storage::delete_original(&state.s3, bucket, &key)).await?;

    info!("Ingested CV {cv_id} for user {user_id} (parsed: {})", row.parsed_data.is_some());
    Ok(UploadSummary::from(&row))
}

pub async fn load_cv(state: &AppState, cv_id: Uuid, user_id: Uuid) -> Result<CvRow, AppError> {
    repository::get_cv(&state.db, cv_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {cv_id} not found")))
}

/// Re-runs extraction and structuring on the stored original.
pub async fn reparse(state: &AppState, cv_id: Uuid, user_id: Uuid) -> Result<CvRow, AppError> {
    let cv = load_cv(state, cv_id, user_id).await?;
    let bytes = storage::get_original(&state.s3, &state.config.s3_bucket, &cv.storage_key).await?;

    let outcome =
        parse_document(&state.structurer, bytes, storage::key_extension(&cv.storage_key)).await;
    let row =
        repository::replace_parsed_data(&state.db, cv.id, outcome.parsed_json()?, outcome.error.clone())
            .await?;

    info!("Re-parsed CV {cv_id} (parsed: {})", row.parsed_data.is_some());
    Ok(row)
}

pub async fn remove(state: &AppState, cv_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let cv = repository::delete_cv(&state.db, cv_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {cv_id} not found")))?;

    // the row is gone either way; a leftover object is only logged
    if let Err(e) = storage::delete_original(&state.s3, &state.config.s3_bucket, &cv.storage_key).await {
        warn!("CV {cv_id} deleted but its original was not: {e}");
    }
    Ok(())
}

pub struct GeneratedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `Jane Doe CV.docx` → `Jane_Doe_CV_branded.pdf`
pub fn branded_filename(original: &str) -> String {
    let stem = std::path::Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cv");
    let safe: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let safe = if safe.is_empty() { "cv".to_string() } else { safe };
    format!("{safe}_branded.pdf")
}

/// Renders a stored CV with the chosen (or default) template and the user's
/// organization branding, then marks it `Branded`.
pub async fn generate(
    state: &AppState,
    cv_id: Uuid,
    user_id: Uuid,
    template_id: Option<Uuid>,
) -> Result<GeneratedPdf, AppError> {
    let cv = load_cv(state, cv_id, user_id).await?;
    let parsed = cv.parsed_data.clone().ok_or_else(|| {
        AppError::UnprocessableEntity(format!(
            "CV {cv_id} has no structured data; re-parse it first"
        ))
    })?;
    let resume: StructuredResume =
        serde_json::from_value(parsed).map_err(|e| AppError::Internal(e.into()))?;

    let template = repository::find_template(&state.db, user_id, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No template found for this user".to_string()))?;
    let descriptor = template.descriptor().map_err(|e| {
        AppError::UnprocessableEntity(format!("Template {} has malformed sections: {e}", template.id))
    })?;

    let organization = repository::find_organization(&state.db, user_id)
        .await?
        .map(OrganizationProfile::from)
        .unwrap_or_default();

    let output_path: PathBuf = state
        .config
        .scratch_dir
        .join(format!("{cv_id}-{}.pdf", Uuid::new_v4()));

    state
        .renderer
        .render(&resume, &descriptor, &organization, &output_path)
        .await?;

    let bytes = tokio::fs::read(&output_path)
        .await
        .map_err(|e| AppError::Render(format!("reading {} failed: {e}", output_path.display())));
    if let Err(e) = tokio::fs::remove_file(&output_path).await {
        warn!("Could not remove {}: {e}", output_path.display());
    }
    let bytes = bytes?;

    repository::set_status(&state.db, cv_id, user_id, CvStatus::Branded).await?;
    info!("Generated branded PDF for CV {cv_id} with template {}", template.id);

    Ok(GeneratedPdf {
        filename: branded_filename(&cv.original_filename),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::extraction::docx::tests::docx_with_paragraphs;
    use crate::llm_client::LlmError;
    use crate::structuring::tests::ScriptedCompletion;

    fn upload(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_validate_upload_checks_format_then_size() {
        assert!(matches!(
            validate_upload(&upload("cv.txt", b"text"), 100),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_upload(&upload("cv.pdf", &[0u8; 101]), 100),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_upload(&upload("cv.pdf", b""), 100),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            validate_upload(&upload("CV.DOCX", b"PK"), 100).unwrap(),
            DocumentFormat::Word
        );
    }

    #[test]
    fn test_branded_filename_is_header_safe() {
        assert_eq!(branded_filename("Jane Doe CV.docx"), "Jane_Doe_CV_branded.pdf");
        assert_eq!(branded_filename("résumé\".pdf"), "r_sum___branded.pdf");
    }

    #[tokio::test]
    async fn test_failed_record_discards_the_stored_original() {
        let discarded = AtomicBool::new(false);

        let result: Result<(), AppError> = record_or_discard(
            async { Err(AppError::Internal(anyhow::anyhow!("insert failed"))) },
            || async {
                discarded.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(discarded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_discard_keeps_the_record_error() {
        let result: Result<(), AppError> = record_or_discard(
            async { Err(AppError::Validation("bad row".to_string())) },
            || async { Err(AppError::S3("delete failed".to_string())) },
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(ref m)) if m == "bad row"));
    }

    #[tokio::test]
    async fn test_successful_record_keeps_the_original() {
        let discarded = AtomicBool::new(false);

        let value = record_or_discard(async { Ok(7) }, || async {
            discarded.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(!discarded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_parse_document_structures_a_docx() {
        let llm = Arc::new(ScriptedCompletion::replying(
            r#"{"personal_info": {"name": "Jane Doe"}, "skills": "Rust, SQL"}"#,
        ));
        let structurer = ResumeStructurer::new(llm.clone());
        let bytes = Bytes::from(docx_with_paragraphs(&[&["Jane Doe"], &["Rust, SQL"]]));

        let outcome = parse_document(&structurer, bytes, "docx").await;

        assert!(outcome.error.is_none());
        let resume = outcome.parsed.unwrap();
        assert_eq!(resume.personal_info.name, "Jane Doe");
        assert_eq!(resume.skills, vec!["Rust", "SQL"]);
        assert!(llm.prompts.lock().unwrap()[0].contains("Jane Doe Rust, SQL"));
    }

    #[tokio::test]
    async fn test_parse_document_captures_extraction_failure() {
        let llm = Arc::new(ScriptedCompletion::replying("{}"));
        let structurer = ResumeStructurer::new(llm.clone());

        let outcome = parse_document(&structurer, Bytes::from_static(b"garbage"), "pdf").await;

        assert!(outcome.parsed.is_none());
        assert!(outcome.error.unwrap().starts_with("PDF extraction failed"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_document_captures_model_failure() {
        let llm = Arc::new(ScriptedCompletion::failing(|| {
            LlmError::Timeout(std::time::Duration::from_secs(60))
        }));
        let structurer = ResumeStructurer::new(llm);
        let bytes = Bytes::from(docx_with_paragraphs(&[&["Jane Doe"]]));

        let outcome = parse_document(&structurer, bytes, "docx").await;

        assert!(outcome.parsed.is_none());
        assert!(outcome.error.unwrap().contains("deadline"));
    }
}
