//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FapiaoError, Result};

/// Main configuration for the fapiao pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FapiaoConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// External OCR configuration.
    pub ocr: OcrConfig,
}

/// Invoice extraction configuration.
///
/// The fallback switches control heuristics that guess a value when no
/// labeled evidence exists. Values recovered that way are reported in
/// `ExtractionResult::fallbacks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Accept a bare 8-24 digit run as invoice number when no label matched.
    pub invoice_number_fallback: bool,

    /// Take the last two decimal amounts as amount/tax when no summary line matched.
    pub trailing_amounts_fallback: bool,

    /// Assign names and tax ids by position when they are not paired.
    pub positional_party_fallback: bool,

    /// Characters after a buyer/seller keyword searched for a name label.
    pub party_context_window: usize,

    /// Repair known OCR confusions in extracted names and dates.
    pub apply_ocr_corrections: bool,

    /// Maximum characters of normalized text kept in `rawTextSample`.
    pub raw_text_sample_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            invoice_number_fallback: true,
            trailing_amounts_fallback: true,
            positional_party_fallback: true,
            party_context_window: 64,
            apply_ocr_corrections: true,
            raw_text_sample_len: 1000,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider the text layer usable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 10,
        }
    }
}

/// External OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Executable to invoke.
    pub command: String,

    /// Tesseract language list.
    pub languages: String,

    /// Page segmentation mode (6 = single uniform block of text).
    pub page_segmentation_mode: u8,

    /// Keep spacing between words as recognized.
    pub preserve_interword_spaces: bool,

    /// Retry once with the engine's default options if the first run fails.
    pub retry_with_defaults: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            languages: "chi_sim+eng".to_string(),
            page_segmentation_mode: 6,
            preserve_interword_spaces: true,
            retry_with_defaults: true,
        }
    }
}

impl FapiaoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FapiaoError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FapiaoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FapiaoConfig =
            serde_json::from_str(r#"{"extraction": {"party_context_window": 10}}"#).unwrap();
        assert_eq!(config.extraction.party_context_window, 10);
        assert!(config.extraction.invoice_number_fallback);
        assert_eq!(config.extraction.raw_text_sample_len, 1000);
        assert_eq!(config.ocr.languages, "chi_sim+eng");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(FapiaoConfig::from_file(&path), Err(FapiaoError::Config(_))));
        assert!(matches!(
            FapiaoConfig::from_file(&dir.path().join("missing.json")),
            Err(FapiaoError::Io(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FapiaoConfig::default();
        config.extraction.trailing_amounts_fallback = false;
        config.save(&path).unwrap();

        let loaded = FapiaoConfig::from_file(&path).unwrap();
        assert!(!loaded.extraction.trailing_amounts_fallback);
        assert_eq!(loaded.pdf.min_text_length, 10);
    }
}
