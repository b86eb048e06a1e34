//! OCR boundary: the [`OcrEngine`] trait and its Tesseract implementation.
//!
//! The engine receives an encoded grayscale image plus a language hint and
//! returns whatever text it finds. Everything behind the trait is opaque to
//! the pipeline, which only cares about the returned string.

use std::collections::HashMap;

use rusty_tesseract::{Args, Image};

/// Errors that can occur at the OCR boundary.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to decode image for OCR: {0}")]
    ImageDecode(String),

    #[error("OCR engine failed: {0}")]
    EngineFailed(String),
}

/// An optical character recognition engine.
///
/// Implementations may block; the pipeline runs them on a blocking task.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded (PNG) image.
    ///
    /// `language` is a Tesseract-style language code such as "eng".
    /// Returns the raw recognized text, untrimmed.
    fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError>;
}

/// OCR engine backed by the system Tesseract installation.
#[derive(Debug, Default)]
pub struct TesseractEngine;

impl OcrEngine for TesseractEngine {
    fn recognize(&self, png: &[u8], language: &str) -> Result<String, OcrError> {
        let dynamic_img =
            image::load_from_memory(png).map_err(|e| OcrError::ImageDecode(e.to_string()))?;

        log::info!(
            "Running OCR ({}) on {}x{} image",
            language,
            dynamic_img.width(),
            dynamic_img.height()
        );

        let tess_img = Image::from_dynamic_image(&dynamic_img)
            .map_err(|e| OcrError::ImageDecode(e.to_string()))?;

        let args = Args {
            lang: language.to_string(),
            config_variables: HashMap::new(),
            dpi: Some(150),
            psm: Some(3), // Fully automatic page segmentation
            oem: Some(3), // Default OCR engine mode
        };

        let text = rusty_tesseract::image_to_string(&tess_img, &args)
            .map_err(|e| OcrError::EngineFailed(e.to_string()))?;

        log::info!("OCR returned {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_rejects_garbage_image() {
        let engine = TesseractEngine;
        let result = engine.recognize(b"definitely not a png", "eng");
        assert!(matches!(result, Err(OcrError::ImageDecode(_))));
    }

    #[test]
    fn test_ocr_error_display() {
        let e = OcrError::EngineFailed("tesseract not found".to_string());
        assert_eq!(e.to_string(), "OCR engine failed: tesseract not found");
        let e = OcrError::ImageDecode("bad header".to_string());
        assert_eq!(e.to_string(), "Failed to decode image for OCR: bad header");
    }
}
