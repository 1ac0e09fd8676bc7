//! Raw text acquisition for invoice documents.
//!
//! Dispatches a file to the PDF text layer, the OCR engine, or reads it
//! directly when it already is recognized text.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::SourceError;
use crate::invoice::{ExtractionResult, InvoiceParser};
use crate::models::config::FapiaoConfig;
use crate::ocr::{OcrEngine, TesseractEngine};
use crate::pdf::PdfExtractor;

/// Kind of document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Text,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp", "gif"];

impl DocumentKind {
    /// Detect the kind of `path` from its extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            e if IMAGE_EXTENSIONS.contains(&e) => Some(Self::Image),
            _ => None,
        }
    }

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// Raw text of one document.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    pub kind: DocumentKind,
    pub text: String,
}

/// Read the raw text of `path`, reporting progress in `0.0..=1.0`.
pub fn acquire_text(
    path: &Path,
    config: &FapiaoConfig,
    progress: &mut dyn FnMut(f32),
) -> Result<AcquiredText, SourceError> {
    let kind = DocumentKind::detect(path)
        .ok_or_else(|| SourceError::Unsupported(path.display().to_string()))?;
    info!("Acquiring text from {} ({})", path.display(), kind.label());

    let text = match kind {
        DocumentKind::Text => {
            let text = std::fs::read_to_string(path)?;
            progress(1.0);
            text
        }
        DocumentKind::Image => {
            let engine = TesseractEngine::with_config(config.ocr.clone());
            debug!("Recognizing {} with {}", path.display(), engine.name());
            let result = engine.recognize(path, progress)?;
            if result.used_default_options {
                info!("{} recognized with default OCR options", path.display());
            }
            debug!("OCR took {}ms", result.processing_time_ms);
            result.text
        }
        DocumentKind::Pdf => {
            let data = std::fs::read(path)?;
            let extractor = PdfExtractor::from_bytes(&data)?;
            let limit = page_limit(config.pdf.max_pages);
            let content = extractor.extract_all(limit, &mut |page, total| {
                progress(page as f32 / total as f32)
            })?;

            let blank = content.pages.iter().filter(|p| p.text.trim().is_empty()).count();
            debug!(
                "Read {} of {} pages ({} without text)",
                content.pages.len(),
                content.total_pages,
                blank
            );

            if !content.has_text_layer(config.pdf.min_text_length) {
                debug!("PDF text layer shorter than {} chars", config.pdf.min_text_length);
                return Err(SourceError::NoText);
            }
            content.text
        }
    };

    debug!("Acquired {} chars", text.len());
    Ok(AcquiredText { kind, text })
}

/// Page limit for the PDF extractor, saturating at `u32::MAX` (0 = all).
fn page_limit(max_pages: usize) -> u32 {
    u32::try_from(max_pages).unwrap_or(u32::MAX)
}

/// Acquire the raw text of `path` and run `parser` over it.
///
/// Fails with [`SourceError::NoText`] when the document yields only whitespace.
pub fn extract_file<P: InvoiceParser + ?Sized>(
    path: &Path,
    config: &FapiaoConfig,
    parser: &P,
    progress: &mut dyn FnMut(f32),
) -> crate::Result<ExtractionResult> {
    let acquired = acquire_text(path, config, progress)?;
    if acquired.text.trim().is_empty() {
        return Err(SourceError::NoText.into());
    }

    Ok(parser.parse(&acquired.text))
}
