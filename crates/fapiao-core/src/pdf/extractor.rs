//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PageProgress, PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text layer extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted text content of a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Page texts joined with newlines.
    pub text: String,
    /// Pages with their text.
    pub pages: Vec<PdfPage>,
    /// Number of pages in the document, including unread ones.
    pub total_pages: u32,
}

/// Text from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfContent {
    /// Check whether the text layer carries at least `min_len` visible characters.
    pub fn has_text_layer(&self, min_len: usize) -> bool {
        self.text.chars().filter(|c| !c.is_whitespace()).count() >= min_len
    }
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor from PDF bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Extract page texts in order, reporting `(page, total)` after each page.
    ///
    /// `max_pages` limits how many pages are read (0 = all). When the per-page
    /// text layer is empty, the whole-document extraction of pdf-extract is used
    /// instead.
    pub fn extract_all(
        &self,
        max_pages: u32,
        progress: &mut PageProgress<'_>,
    ) -> Result<PdfContent> {
        let total_pages = self.page_count();
        if total_pages == 0 {
            return Err(PdfError::NoPages);
        }

        let limit = match max_pages {
            0 => total_pages,
            n => n.min(total_pages),
        };

        let mut pages = Vec::with_capacity(limit as usize);
        for page_num in 1..=limit {
            let text = match self.extract_page_text(page_num) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read text of page {}: {}", page_num, e);
                    String::new()
                }
            };
            trace!("Page {}: {} chars", page_num, text.len());

            pages.push(PdfPage {
                number: page_num,
                text,
            });
            progress(page_num, limit);
        }

        let mut text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            debug!("Per-page text layer empty, trying whole document extraction");
            text = self.extract_text().unwrap_or_default();
        }

        debug!(
            "PDF text: {} of {} pages, {} chars",
            limit,
            total_pages,
            text.len()
        );

        Ok(PdfContent {
            text,
            pages,
            total_pages,
        })
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf_extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.raw_data.is_empty() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
