//! HTML → PDF rasterization behind a trait, so tests never spawn a process.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::RenderError;

#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    /// Turns the HTML file at `html_path` into a PDF written to `pdf_path`.
    async fn rasterize(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError>;
}

/// Runs an external converter as `<program> [args..] <input.html> <output.pdf>`.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl CommandRasterizer {
    /// Parses a whitespace-separated command line such as `"weasyprint -q"`.
    pub fn from_command_line(command_line: &str) -> Result<Self, RenderError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| RenderError::Rasterizer("PDF render command is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PdfRasterizer for CommandRasterizer {
    async fn rasterize(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
        debug!(
            "Rasterizing {} -> {} with {}",
            html_path.display(),
            pdf_path.display(),
            self.program
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(html_path)
            .arg(pdf_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RenderError::Rasterizer(format!("Failed to execute {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(RenderError::Rasterizer(format!(
                "{} exited with {}: stderr={}, stdout={}",
                self.program,
                output.status,
                stderr.trim(),
                stdout.trim()
            )));
        }

        Ok(())
    }
}
