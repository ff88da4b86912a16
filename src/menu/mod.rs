// src/menu/mod.rs
// =============================================================================
// This module decides what counts as "a menu".
//
// Submodules:
// - patterns: URL keywords, price regexes, menu vocabulary
// - detector: OCR-based scoring of photos
// - ocr: the text recognition backend (tesseract)
// =============================================================================

mod detector;
mod ocr;
mod patterns;

pub use detector::{list_images, MenuDetectionResult, MenuDetector};
pub use ocr::TesseractRecognizer;
pub use patterns::{is_menu_candidate, is_pdf_link};
