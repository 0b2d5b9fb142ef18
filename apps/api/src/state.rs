use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::rendering::TemplateRenderer;
use crate::structuring::ResumeStructurer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Wraps the completion backend; one model call per document.
    pub structurer: ResumeStructurer,
    pub renderer: TemplateRenderer,
}
