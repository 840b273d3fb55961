//! OCR backends and page preprocessing.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OcrError;
use crate::models::config::BillexConfig;

/// Turns a page image into raw text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<T: OcrBackend + ?Sized> OcrBackend for Arc<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// Returns a preset text for every image.
///
/// Used when the text is already known (tests, pre-OCRed documents).
#[derive(Debug, Clone)]
pub struct StaticTextRecognizer {
    text: String,
}

impl StaticTextRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for StaticTextRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Backend used when no OCR models are configured. Text-only PDFs still
/// work; image pages fail with [`OcrError::NotAvailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

/// Build the OCR backend described by the configuration.
///
/// Without a model directory the backend is [`UnavailableRecognizer`], so
/// documents with embedded text can still be processed.
pub fn backend_from_config(config: &BillexConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    let Some(model_dir) = config.models.model_dir.as_deref() else {
        warn!("No OCR model directory configured; image pages cannot be read");
        return Ok(Box::new(UnavailableRecognizer));
    };

    #[cfg(feature = "native")]
    {
        tracing::debug!("Loading OCR models from {}", model_dir.display());
        let engine = PureOcrEngine::from_config(config)?;
        Ok(Box::new(engine))
    }

    #[cfg(not(feature = "native"))]
    {
        warn!(
            "Built without the `native` feature; ignoring model directory {}",
            model_dir.display()
        );
        Ok(Box::new(UnavailableRecognizer))
    }
}

/// A recognized text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Axis-aligned bounds (min_x, min_y, max_x, max_y).
    pub rect: (f32, f32, f32, f32),

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub score: f32,
}

impl TextBox {
    fn center_y(&self) -> f32 {
        (self.rect.1 + self.rect.3) / 2.0
    }
}

/// Join text boxes into lines of text in reading order.
///
/// Boxes whose vertical centers lie within `tolerance` pixels of the first
/// box of a line belong to that line; a line reads left to right.
pub fn assemble_text(mut boxes: Vec<TextBox>, tolerance: f32) -> String {
    boxes.retain(|b| !b.text.trim().is_empty());
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut lines: Vec<Vec<TextBox>> = Vec::new();
    for text_box in boxes {
        match lines.last_mut() {
            Some(line) if (text_box.center_y() - line[0].center_y()).abs() <= tolerance => {
                line.push(text_box)
            }
            _ => lines.push(vec![text_box]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.rect.0.total_cmp(&b.rect.0));
            line.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f32, y: f32) -> TextBox {
        TextBox {
            rect: (x, y, x + 50.0, y + 12.0),
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_static_recognizer_ignores_image() {
        let recognizer = StaticTextRecognizer::new("Bill No: 7");
        let image = DynamicImage::new_luma8(4, 4);
        assert_eq!(recognizer.recognize(&image).unwrap(), "Bill No: 7");
    }

    #[test]
    fn test_unavailable_recognizer() {
        let image = DynamicImage::new_luma8(4, 4);
        assert!(matches!(
            UnavailableRecognizer.recognize(&image),
            Err(OcrError::NotAvailable)
        ));
    }

    #[test]
    fn test_boxed_and_shared_backends() {
        let image = DynamicImage::new_luma8(1, 1);
        let boxed: Box<dyn OcrBackend> = Box::new(StaticTextRecognizer::new("a"));
        let shared: Arc<dyn OcrBackend> = Arc::new(StaticTextRecognizer::new("b"));
        assert_eq!(boxed.recognize(&image).unwrap(), "a");
        assert_eq!(shared.recognize(&image).unwrap(), "b");
    }

    #[test]
    fn test_assemble_text_groups_lines() {
        let boxes = vec![
            text_box("₹2,000", 300.0, 102.0),
            text_box("Bill No: 12", 10.0, 40.0),
            text_box("Room Rent -", 10.0, 98.0),
            text_box("[UNK]", 10.0, 160.0),
            text_box("   ", 10.0, 200.0),
        ];

        assert_eq!(
            assemble_text(boxes, 20.0),
            "Bill No: 12\nRoom Rent - ₹2,000\n[UNK]"
        );
    }

    #[test]
    fn test_backend_without_models_is_unavailable() {
        let backend = backend_from_config(&BillexConfig::default()).unwrap();
        let image = DynamicImage::new_luma8(2, 2);
        assert!(matches!(backend.recognize(&image), Err(OcrError::NotAvailable)));
    }

    #[test]
    fn test_assemble_text_empty() {
        assert_eq!(assemble_text(Vec::new(), 20.0), "");
    }
}
