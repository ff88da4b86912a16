// src/menu/detector.rs
// =============================================================================
// Decides whether a photo is a menu, from its OCR text and its shape.
//
// Scoring:
// - price patterns found       +2
// - 2+ distinct menu keywords  +2
// - more than 30 text lines    +1
// - more than 300 words        +1
// - portrait ratio 0.6..=0.8   +1
// A score of 3 or more is a menu. Confidence is score / 5, capped at 1.0,
// so scores of 5, 6 and 7 all report full confidence.
// =============================================================================

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::ocr::TextRecognizer;
use super::patterns::{count_keywords, count_prices};
use crate::config::DetectorConfig;

const MENU_THRESHOLD: u8 = 3;
const MIN_LINES: usize = 30;
const MIN_WORDS: usize = 300;
const PORTRAIT_MIN: f64 = 0.6;
const PORTRAIT_MAX: f64 = 0.8;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Raw measurements taken from one photo
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MenuFeatures {
    pub line_count: usize,
    pub word_count: usize,
    pub price_count: usize,
    pub keyword_count: usize,
    pub aspect_ratio: f64,
}

impl MenuFeatures {
    pub fn measure(text: &str, aspect_ratio: f64) -> Self {
        Self {
            line_count: text.lines().filter(|l| !l.trim().is_empty()).count(),
            word_count: text.split_whitespace().count(),
            price_count: count_prices(text),
            keyword_count: count_keywords(text),
            aspect_ratio,
        }
    }
}

/// Outcome of checking one photo
#[derive(Debug, Clone, Serialize)]
pub struct MenuDetectionResult {
    pub path: PathBuf,
    pub is_menu: bool,
    pub score: u8,
    pub confidence: f64,
    /// Why the score is what it is, in scoring order
    pub reasons: Vec<String>,
    #[serde(flatten)]
    pub features: MenuFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text_path: Option<PathBuf>,
}

impl MenuDetectionResult {
    /// Scores a set of measurements
    pub fn from_features(path: PathBuf, features: MenuFeatures) -> Self {
        let mut score = 0;
        let mut reasons = Vec::new();

        if features.price_count > 0 {
            score += 2;
            reasons.push(format!("Found {} price patterns", features.price_count));
        }

        if features.keyword_count >= 2 {
            score += 2;
            reasons.push(format!("Found {} menu keywords", features.keyword_count));
        }

        if features.line_count > MIN_LINES {
            score += 1;
            reasons.push(format!("{} lines of text", features.line_count));
        }

        if features.word_count > MIN_WORDS {
            score += 1;
            reasons.push(format!("{} words detected", features.word_count));
        }

        if (PORTRAIT_MIN..=PORTRAIT_MAX).contains(&features.aspect_ratio) {
            score += 1;
            reasons.push(format!(
                "Portrait aspect ratio ({:.2})",
                features.aspect_ratio
            ));
        }

        let is_menu = score >= MENU_THRESHOLD;
        if !is_menu && score > 0 {
            reasons.push(format!(
                "Score {}/5 below threshold (need {})",
                score, MENU_THRESHOLD
            ));
        }

        Self {
            path,
            is_menu,
            score,
            confidence: (f64::from(score) / 5.0).min(1.0),
            reasons,
            features,
            ocr_text_path: None,
        }
    }

    fn missing(path: PathBuf) -> Self {
        Self {
            path,
            is_menu: false,
            score: 0,
            confidence: 0.0,
            reasons: vec!["File does not exist".to_string()],
            features: MenuFeatures::default(),
            ocr_text_path: None,
        }
    }
}

/// A directory's photos, split by verdict
#[derive(Debug, Default, Serialize)]
pub struct DirectoryScan {
    pub menu_photos: Vec<PathBuf>,
    pub other_photos: Vec<PathBuf>,
}

/// OCR-based menu photo detector
pub struct MenuDetector<R> {
    recognizer: R,
    save_ocr: bool,
}

impl<R: TextRecognizer> MenuDetector<R> {
    pub fn new(recognizer: R, config: &DetectorConfig) -> Self {
        Self {
            recognizer,
            save_ocr: config.save_ocr,
        }
    }

    /// Checks one photo
    pub async fn detect_menu(&self, image: &Path) -> MenuDetectionResult {
        if !image.exists() {
            return MenuDetectionResult::missing(image.to_path_buf());
        }

        let text = match self.recognizer.recognize(image).await {
            Ok(text) => text,
            Err(e) => {
                debug!("OCR failed for {}: {}", image.display(), e);
                String::new()
            }
        };

        let features = MenuFeatures::measure(&text, aspect_ratio(image));
        debug!(
            "OCR extracted {} chars, {} lines from {}",
            text.len(),
            features.line_count,
            image.display()
        );

        let mut result = MenuDetectionResult::from_features(image.to_path_buf(), features);

        if self.save_ocr && result.is_menu {
            let transcript = image.with_extension("txt");
            match tokio::fs::write(&transcript, &text).await {
                Ok(()) => result.ocr_text_path = Some(transcript),
                Err(e) => warn!("Failed to save OCR text for {}: {}", image.display(), e),
            }
        }

        result
    }

    /// Checks every photo, keeping input order
    pub async fn analyze_photos(&self, photos: &[PathBuf]) -> Vec<MenuDetectionResult> {
        let mut results = Vec::with_capacity(photos.len());

        for photo in photos {
            let result = self.detect_menu(photo).await;

            if result.is_menu {
                info!(
                    "Menu detected: {} (score: {}/5, {} prices, {} keywords)",
                    photo.display(),
                    result.score,
                    result.features.price_count,
                    result.features.keyword_count
                );
            } else {
                debug!("Not a menu: {} (score: {}/5)", photo.display(), result.score);
            }

            results.push(result);
        }

        results
    }

    /// Only the photos that look like menus
    pub async fn filter_menu_photos(&self, photos: &[PathBuf]) -> Vec<PathBuf> {
        let menus: Vec<PathBuf> = self
            .analyze_photos(photos)
            .await
            .into_iter()
            .filter(|r| r.is_menu)
            .map(|r| r.path)
            .collect();

        info!(
            "Identified {} menu photos out of {} total",
            menus.len(),
            photos.len()
        );
        menus
    }

    /// Splits the images directly inside `dir` into menus and other photos
    pub async fn detect_menus_in_directory(&self, dir: &Path) -> std::io::Result<DirectoryScan> {
        let photos = list_images(dir)?;
        let mut scan = DirectoryScan::default();

        for result in self.analyze_photos(&photos).await {
            if result.is_menu {
                scan.menu_photos.push(result.path);
            } else {
                scan.other_photos.push(result.path);
            }
        }

        Ok(scan)
    }
}

/// jpg/jpeg/png files directly inside `dir` (any extension case), sorted
pub fn list_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// width / height, or 0.0 when the image can't be read
fn aspect_ratio(photo: &Path) -> f64 {
    match image::image_dimensions(photo) {
        Ok((width, height)) if height > 0 => f64::from(width) / f64::from(height),
        Ok(_) => 0.0,
        Err(e) => {
            debug!("Failed to get aspect ratio for {}: {}", photo.display(), e);
            0.0
        }
    }
}
