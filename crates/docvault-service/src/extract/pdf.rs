//! PDF text.

use std::panic;

use super::error::ExtractError;

/// Text of every page, in page order.
pub(crate) fn extract(data: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed documents.
    let result = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
        .map_err(|_| ExtractError::Pdf("parser aborted".to_string()))?;
    let text = result.map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(text.trim().to_string())
}
