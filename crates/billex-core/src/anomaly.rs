//! Pixel-statistic anomaly flags for page images.
//!
//! Two crude heuristics: a very high grayscale standard deviation hints at
//! overwriting, and a histogram dominated by one bin hints at inconsistent
//! ink or fonts. Results are advisory strings only.

use image::GrayImage;
use ndarray::Array2;
use tracing::debug;

use crate::models::config::AnomalyConfig;

pub const HIGH_CONTRAST: &str = "High contrast: possible overwriting.";
pub const HISTOGRAM_ANOMALY: &str = "Histogram anomaly: possible font/ink inconsistency.";

/// Flags pixel-statistic irregularities.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Inspect a grayscale page image.
    pub fn detect(&self, image: &GrayImage) -> Vec<&'static str> {
        let mut anomalies = Vec::new();
        if !self.config.enabled || image.width() == 0 || image.height() == 0 {
            return anomalies;
        }

        let std = pixel_std(image);
        if std > self.config.std_threshold {
            anomalies.push(HIGH_CONTRAST);
        }

        let ratio = histogram_peak_ratio(image, self.config.histogram_bins);
        if ratio > self.config.histogram_peak_ratio {
            anomalies.push(HISTOGRAM_ANOMALY);
        }

        debug!("pixel std {:.2}, histogram peak ratio {:.2}", std, ratio);
        anomalies
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

/// Population standard deviation of pixel intensities.
fn pixel_std(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    let pixels = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        image.get_pixel(x as u32, y as u32)[0] as f64
    });
    pixels.std(0.0)
}

/// Largest bin over mean bin count, for equal-width bins spanning [0, 255].
fn histogram_peak_ratio(image: &GrayImage, bins: usize) -> f64 {
    let bins = bins.max(1);
    let mut histogram = vec![0u64; bins];

    for pixel in image.pixels() {
        let index = (pixel[0] as f64 * bins as f64 / 255.0) as usize;
        histogram[index.min(bins - 1)] += 1;
    }

    let max = histogram.iter().copied().max().unwrap_or(0) as f64;
    let mean = histogram.iter().sum::<u64>() as f64 / bins as f64;
    max / (mean + 1e-6)
}
