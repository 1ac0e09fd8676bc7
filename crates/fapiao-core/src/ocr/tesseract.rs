//! Tesseract command line engine.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{OcrEngine, OcrProgress, OcrResult, Result};
use crate::error::SourceError;
use crate::models::config::OcrConfig;

/// OCR engine running the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::with_config(OcrConfig::default())
    }

    /// Create an engine with the given settings.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Arguments for recognizing `image` to stdout.
    ///
    /// With `tuned == false` only the language list is passed, leaving page
    /// segmentation and spacing to the engine defaults.
    pub fn arguments(&self, image: &Path, tuned: bool) -> Vec<String> {
        let mut args = vec![
            image.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.languages.clone(),
        ];

        if tuned {
            args.push("--psm".to_string());
            args.push(self.config.page_segmentation_mode.to_string());
            if self.config.preserve_interword_spaces {
                args.push("-c".to_string());
                args.push("preserve_interword_spaces=1".to_string());
            }
        }

        args
    }

    fn run(&self, image: &Path, tuned: bool) -> Result<String> {
        let args = self.arguments(image, tuned);
        debug!("Running {} {:?}", self.config.command, args);

        let output = Command::new(&self.config.command)
            .args(&args)
            .output()
            .map_err(|e| {
                SourceError::Ocr(format!("failed to start {}: {}", self.config.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Ocr(format!(
                "{} exited with {}: {}",
                self.config.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &Path, progress: &mut OcrProgress<'_>) -> Result<OcrResult> {
        let start = Instant::now();
        info!("Running OCR on {}", image.display());
        progress(0.0);

        let (text, used_default_options) = match self.run(image, true) {
            Ok(text) => (text, false),
            Err(e) if self.config.retry_with_defaults => {
                warn!("OCR failed ({}), retrying with default options", e);
                (self.run(image, false)?, true)
            }
            Err(e) => return Err(e),
        };

        progress(1.0);
        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!("OCR produced {} chars in {}ms", text.len(), processing_time_ms);

        Ok(OcrResult {
            text,
            processing_time_ms,
            used_default_options,
        })
    }

    fn name(&self) -> &str {
        &self.config.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tuned_arguments() {
        let engine = TesseractEngine::new();
        let args = engine.arguments(Path::new("scan.png"), true);
        assert_eq!(
            args,
            vec![
                "scan.png",
                "stdout",
                "-l",
                "chi_sim+eng",
                "--psm",
                "6",
                "-c",
                "preserve_interword_spaces=1",
            ]
        );
    }

    #[test]
    fn test_default_arguments() {
        let engine = TesseractEngine::new();
        let args = engine.arguments(Path::new("scan.png"), false);
        assert_eq!(args, vec!["scan.png", "stdout", "-l", "chi_sim+eng"]);
    }

    #[test]
    fn test_missing_binary_is_ocr_error() {
        let engine = TesseractEngine::with_config(OcrConfig {
            command: "fapiao-test-no-such-ocr-binary".to_string(),
            ..OcrConfig::default()
        });

        let mut reported = Vec::new();
        let result = engine.recognize(Path::new("scan.png"), &mut |p| reported.push(p));

        assert!(matches!(result, Err(SourceError::Ocr(_))));
        assert_eq!(reported, vec![0.0]);
    }
}
