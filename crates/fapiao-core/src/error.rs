//! Error types for the fapiao-core library.
//!
//! Field extraction itself never fails; these errors belong to text
//! acquisition (PDF text layer, OCR) and configuration handling. PDF errors
//! reach callers wrapped in [`SourceError::Pdf`].

use thiserror::Error;

/// Main error type for the fapiao library.
#[derive(Error, Debug)]
pub enum FapiaoError {
    /// Text acquisition error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while obtaining raw text from a document.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document kind is not handled by any text source.
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    /// The OCR engine could not be started or exited with an error.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The document yielded no text at all.
    #[error("no text could be extracted")]
    NoText,

    /// Text layer extraction failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// Reading the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the fapiao library.
pub type Result<T> = std::result::Result<T, FapiaoError>;
