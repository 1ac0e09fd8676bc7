//! OCR bridge to an external recognition engine.
//!
//! Recognition itself is delegated; this module only turns an image file into
//! raw text and reports coarse progress.

mod tesseract;

pub use tesseract::TesseractEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Progress callback receiving a fraction in `0.0..=1.0`.
pub type OcrProgress<'a> = dyn FnMut(f32) + 'a;

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text as emitted by the engine.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Whether the engine had to fall back to its default options.
    pub used_default_options: bool,
}

/// Trait for OCR engines that recognize text from an image file.
pub trait OcrEngine {
    /// Recognize the text of an image, reporting progress as it goes.
    fn recognize(&self, image: &Path, progress: &mut OcrProgress<'_>) -> Result<OcrResult>;

    /// Engine name for diagnostics.
    fn name(&self) -> &str;
}
