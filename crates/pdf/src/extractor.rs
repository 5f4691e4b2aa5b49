//! PDF text extractor implementation.

use doctext_core::{classify_io_error, Error, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every page of the PDF at `path`.
    pub fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| classify_io_error(e, path))?;
        self.extract_from_mem(&bytes)
    }

    /// Extract text from an in-memory PDF.
    ///
    /// Malformed and encrypted documents fail as a whole; no partial text is
    /// returned. Panics raised inside the PDF library are contained and
    /// reported as errors.
    pub fn extract_from_mem(&self, bytes: &[u8]) -> Result<String> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }));

        match outcome {
            Ok(Ok(text)) => {
                log::debug!("Extracted {} characters from PDF", text.chars().count());
                Ok(text)
            }
            Ok(Err(e)) => Err(Error::PdfError(format!("Failed to load or parse PDF: {}", e))),
            Err(payload) => Err(Error::PdfError(format!(
                "PDF library failed on this document: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
