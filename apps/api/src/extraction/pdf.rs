use std::panic;

use tracing::debug;

use super::ExtractionError;

/// Extracts the text of every page, concatenated in document order.
///
/// `pdf-extract` panics on some malformed inputs instead of returning an error;
/// those panics are converted so a corrupt upload fails only its own file.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let outcome = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match outcome {
        Ok(Ok(text)) => {
            debug!("Extracted {} chars from PDF ({} bytes)", text.len(), bytes.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "malformed document".to_string());
            Err(ExtractionError::Pdf(format!("reader aborted: {reason}")))
        }
    }
}
