//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the billex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillexConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// OCR model files.
    pub models: ModelConfig,

    /// Page image preprocessing.
    pub preprocess: PreprocessConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction and reconciliation.
    pub extraction: ExtractionConfig,

    /// Image anomaly heuristics.
    pub anomaly: AnomalyConfig,

    /// HTTP server settings.
    pub server: ServerConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` markers emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Vertical distance (pixels) within which text boxes share a line.
    pub line_merge_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            line_merge_tolerance: 20.0,
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files. OCR is unavailable when unset.
    pub model_dir: Option<PathBuf>,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// Page image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Maximum image dimension (longer side) before downscaling.
    pub max_image_size: u32,

    /// Median filter radius in pixels (0 disables denoising).
    pub denoise_radius: u32,

    /// Apply adaptive thresholding.
    pub binarize: bool,

    /// Side length of the local-mean window (odd).
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean.
    pub threshold_offset: i32,

    /// Estimate and correct page skew.
    pub deskew: bool,

    /// Largest skew angle searched, in degrees.
    pub max_skew_degrees: f32,

    /// Search step, in degrees.
    pub skew_step_degrees: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_image_size: 2800,
            denoise_radius: 1,
            binarize: true,
            threshold_block_size: 31,
            threshold_offset: 10,
            deskew: true,
            max_skew_degrees: 5.0,
            skew_step_degrees: 0.5,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

/// Extraction and reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Absolute difference between printed and computed final totals
    /// tolerated before an anomaly is reported.
    pub total_tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            total_tolerance: Decimal::ONE,
        }
    }
}

/// Pixel-statistic anomaly thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Run the detector on image pages.
    pub enabled: bool,

    /// Grayscale standard deviation above which overwriting is suspected.
    pub std_threshold: f64,

    /// Histogram peak-to-mean ratio above which ink inconsistency is suspected.
    pub histogram_peak_ratio: f64,

    /// Number of histogram bins over [0, 255].
    pub histogram_bins: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            std_threshold: 70.0,
            histogram_peak_ratio: 6.0,
            histogram_bins: 16,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Maximum accepted request body.
    pub body_limit_bytes: usize,

    /// Timeout for downloading a document by URL.
    pub fetch_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            body_limit_bytes: 25 * 1024 * 1024,
            fetch_timeout_secs: 60,
        }
    }
}

impl BillexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file, if a model directory is configured.
    pub fn model_path(&self, model_name: &str) -> Option<PathBuf> {
        self.models.model_dir.as_ref().map(|dir| dir.join(model_name))
    }
}
