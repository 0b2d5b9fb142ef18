//! Template Renderer: structured résumé + template + branding → one PDF file.
//!
//! Flow: layout lookup → section placement and branding resolution →
//!       HTML composition → rasterization into a staged sibling file →
//!       rename onto `output_path`.
//!
//! Either the complete PDF lands at `output_path` or nothing does.

pub mod context;
pub mod html;
pub mod layout;
pub mod rasterizer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::organization::OrganizationProfile;
use crate::models::template::TemplateDescriptor;
use crate::structuring::StructuredResume;
use context::RenderContext;
use layout::LayoutRegistry;
use rasterizer::PdfRasterizer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Render I/O failed: {0}")]
    Io(String),

    #[error("PDF rasterization failed: {0}")]
    Rasterizer(String),

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn io_error(what: &str, path: &Path, e: std::io::Error) -> RenderError {
    RenderError::Io(format!("{what} {}: {e}", path.display()))
}

#[derive(Clone)]
pub struct TemplateRenderer {
    layouts: Arc<LayoutRegistry>,
    rasterizer: Arc<dyn PdfRasterizer>,
    assets_dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(
        layouts: LayoutRegistry,
        rasterizer: Arc<dyn PdfRasterizer>,
        assets_dir: PathBuf,
    ) -> Self {
        Self {
            layouts: Arc::new(layouts),
            rasterizer,
            assets_dir,
        }
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// Builds the complete HTML document without touching the filesystem
    /// beyond logo lookup.
    pub fn render_html(
        &self,
        resume: &StructuredResume,
        template: &TemplateDescriptor,
        organization: &OrganizationProfile,
    ) -> Result<String, RenderError> {
        let layout = self.layouts.get(&template.layout)?;
        let ctx = RenderContext::new(resume, template, organization, &self.assets_dir);
        debug!(
            "Composing '{}' with {} sections",
            layout.name,
            ctx.sections.len()
        );
        Ok(html::compose(layout, &ctx))
    }

    /// Renders the résumé into a PDF at `output_path`.
    pub async fn render(
        &self,
        resume: &StructuredResume,
        template: &TemplateDescriptor,
        organization: &OrganizationProfile,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        // a stale file from an earlier attempt must not survive a failure
        match tokio::fs::remove_file(output_path).await {
            Ok(()) => debug!("Removed stale {}", output_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("Failed to clear", output_path, e)),
        }

        let document = self.render_html(resume, template, organization)?;

        let parent = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let (html_file, pdf_file) =
            tokio::task::spawn_blocking(move || stage_files(&parent, &document)).await??;

        self.rasterizer
            .rasterize(html_file.path(), pdf_file.path())
            .await?;

        let target = output_path.to_path_buf();
        tokio::task::spawn_blocking(move || publish(pdf_file, &target)).await??;
        drop(html_file);

        info!("Rendered CV to {}", output_path.display());
        Ok(())
    }
}

/// Writes the HTML next to the target and reserves the staged PDF path.
fn stage_files(dir: &Path, document: &str) -> Result<(NamedTempFile, NamedTempFile), RenderError> {
    std::fs::create_dir_all(dir).map_err(|e| io_error("Failed to create", dir, e))?;

    let html_file = tempfile::Builder::new()
        .prefix(".cv-")
        .suffix(".html")
        .tempfile_in(dir)
        .map_err(|e| io_error("Failed to stage HTML in", dir, e))?;
    std::fs::write(html_file.path(), document)
        .map_err(|e| io_error("Failed to write", html_file.path(), e))?;

    let pdf_file = tempfile::Builder::new()
        .prefix(".cv-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(|e| io_error("Failed to stage PDF in", dir, e))?;

    Ok((html_file, pdf_file))
}

/// Moves a non-empty staged PDF onto `target`. On error the staged file is
/// dropped, which deletes it.
fn publish(pdf_file: NamedTempFile, target: &Path) -> Result<(), RenderError> {
    let size = std::fs::metadata(pdf_file.path())
        .map_err(|e| io_error("Failed to stat", pdf_file.path(), e))?
        .len();
    if size == 0 {
        return Err(RenderError::Rasterizer(
            "converter exited successfully but wrote no PDF".to_string(),
        ));
    }

    pdf_file
        .persist(target)
        .map_err(|e| io_error("Failed to move PDF to", target, e.error))?;
    Ok(())
}
