mod config;
mod cv;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod rendering;
mod routes;
mod state;
mod structuring;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::rendering::layout::LayoutRegistry;
use crate::rendering::rasterizer::CommandRasterizer;
use crate::rendering::TemplateRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::structuring::ResumeStructurer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CraftCV API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.llm_timeout
    );
    let structurer = ResumeStructurer::new(Arc::new(llm));

    // Initialize renderer
    let layouts = match &config.layouts_dir {
        Some(dir) => LayoutRegistry::with_directory(dir)?,
        None => LayoutRegistry::builtin(),
    };
    info!("Layouts available: {}", layouts.names().join(", "));
    let rasterizer = CommandRasterizer::from_command_line(&config.pdf_render_command)?;
    info!("PDF rasterizer: {}", rasterizer.program());
    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.scratch_dir.display()))?;
    let renderer = TemplateRenderer::new(layouts, Arc::new(rasterizer), config.assets_dir.clone());

    // Build app state
    let state = AppState {
        db,
        s3,
        config: config.clone(),
        structurer,
        renderer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "craftcv-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
