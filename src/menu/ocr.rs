// src/menu/ocr.rs
// =============================================================================
// Text recognition for photos.
//
// The detector only needs "image in, text out", so that is all the
// TextRecognizer trait asks for. The real implementation shells out to the
// `tesseract` command-line tool, which handles grayscale conversion and
// page segmentation itself.
// =============================================================================

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::config::DetectorConfig;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("could not run OCR engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Extracts text from an image file
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String, OcrError>;
}

/// Runs `tesseract <image> stdout -l <lang>`
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            binary: config.tesseract_bin.clone(),
            lang: config.ocr_lang.clone(),
        }
    }

    /// First line of `tesseract --version`, if the tool can be run at all
    pub async fn version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.binary).arg("--version").output().await?;
        if !output.status.success() {
            return Err(failed(&output));
        }
        // Older releases print the version on stderr
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await?;

        if !output.status.success() {
            return Err(failed(&output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn failed(output: &std::process::Output) -> OcrError {
    OcrError::Failed {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_an_io_error() {
        let recognizer = TesseractRecognizer::new(&DetectorConfig {
            tesseract_bin: "definitely-not-an-ocr-engine-8d1f".to_string(),
            ..DetectorConfig::default()
        });

        let result = recognizer.recognize(Path::new("photo.png")).await;
        assert!(matches!(result, Err(OcrError::Io(_))));
        assert!(recognizer.version().await.is_err());
    }
}
