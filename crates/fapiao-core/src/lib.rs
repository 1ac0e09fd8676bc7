//! Core library for Chinese VAT invoice (增值税发票) field extraction.
//!
//! This crate provides:
//! - Raw text acquisition (PDF text layer, external OCR, plain text)
//! - Rule-based extraction of invoice number, code, date, amounts and parties
//! - OCR error correction and amount reconciliation
//! - The invoice record model and pipeline configuration

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod source;

pub use error::{FapiaoError, PdfError, Result, SourceError};
pub use invoice::{
    extract_invoice_info, ExtractionResult, FallbackUse, InvoiceParser, RuleBasedParser,
};
pub use models::config::FapiaoConfig;
pub use models::invoice::{Field, InvoiceRecord};
pub use ocr::{OcrEngine, OcrResult, TesseractEngine};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor};
pub use source::{acquire_text, extract_file, AcquiredText, DocumentKind};
