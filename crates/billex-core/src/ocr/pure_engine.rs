//! OCR backend using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{BillexConfig, OcrConfig};

use super::{assemble_text, OcrBackend, TextBox};

/// Detection + recognition engine loaded from model files on disk.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration,
    /// resolved against its model directory.
    pub fn from_config(config: &BillexConfig) -> Result<Self, OcrError> {
        let resolve = |name: &str| config.model_path(name).ok_or(OcrError::NotAvailable);
        let det_path = resolve(&config.models.detection_model)?;
        let rec_path = resolve(&config.models.recognition_model)?;
        let dict_path = resolve(&config.models.dictionary)?;

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", det_path.display());

        Ok(Self {
            engine,
            config: config.ocr.clone(),
        })
    }

    /// Detect and recognize text regions.
    pub fn detect_boxes(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        Ok(results
            .iter()
            .map(|r| TextBox {
                rect: polygon_to_rect(&r.bounding_box),
                text: if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                score: r.confidence,
            })
            .collect())
    }
}

impl OcrBackend for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let boxes = self.detect_boxes(image)?;
        let count = boxes.len();
        let text = assemble_text(boxes, self.config.line_merge_tolerance);

        info!(
            "OCR complete: {}x{} image, {} text boxes in {}ms",
            width,
            height,
            count,
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Axis-aligned bounds of a detection polygon.
fn polygon_to_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    let mut rect = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for coord in polygon.exterior().coords() {
        rect.0 = rect.0.min(coord.x as f32);
        rect.1 = rect.1.min(coord.y as f32);
        rect.2 = rect.2.max(coord.x as f32);
        rect.3 = rect.3.max(coord.y as f32);
    }
    rect
}
