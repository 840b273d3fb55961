//! Page image preprocessing for OCR.
//!
//! Downscale, grayscale, median denoise, adaptive binarization and
//! projection-profile deskew. Every step except grayscale conversion can be
//! switched off through [`PreprocessConfig`].

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::filter::median_filter;
use imageproc::definitions::Image;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::integral_image::{integral_image, sum_image_pixels};
use tracing::debug;

use crate::models::config::PreprocessConfig;

/// Longest side of the thumbnail used for skew estimation.
const SKEW_SAMPLE_SIZE: u32 = 800;

const WHITE: Luma<u8> = Luma([255]);

/// Image preprocessor for the OCR pipeline.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(PreprocessConfig::default())
    }

    pub fn from_config(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Run every enabled step and return the cleaned grayscale page.
    pub fn prepare(&self, image: &DynamicImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) =
            calculate_resize_dimensions(width, height, self.config.max_image_size);

        let mut gray = if (new_width, new_height) != (width, height) {
            debug!("Downscaling {}x{} to {}x{}", width, height, new_width, new_height);
            image
                .resize_exact(new_width, new_height, FilterType::Triangle)
                .to_luma8()
        } else {
            image.to_luma8()
        };

        if self.config.denoise_radius > 0 {
            gray = median_filter(&gray, self.config.denoise_radius, self.config.denoise_radius);
        }

        if self.config.binarize {
            gray = adaptive_threshold(
                &gray,
                self.config.threshold_block_size,
                self.config.threshold_offset,
            );
        }

        if self.config.deskew {
            let angle = self.estimate_skew(&gray);
            if angle != 0.0 {
                debug!("Deskewing by {:.1} degrees", angle);
                gray = rotate_about_center(
                    &gray,
                    angle.to_radians(),
                    Interpolation::Bilinear,
                    WHITE,
                );
            }
        }

        gray
    }

    /// Find the rotation (degrees) that makes text rows horizontal.
    ///
    /// Every candidate angle is applied to a thumbnail and scored by the
    /// sum of squared dark-pixel counts per row; aligned rows concentrate
    /// ink into few rows and score highest. Ties keep the smallest angle.
    pub fn estimate_skew(&self, image: &GrayImage) -> f32 {
        let step = self.config.skew_step_degrees;
        let limit = self.config.max_skew_degrees;
        if step <= 0.0 || limit <= 0.0 {
            return 0.0;
        }

        let sample = skew_sample(image);
        let steps = (limit / step).round() as i32;

        let mut best_angle = 0.0f32;
        let mut best_score = projection_score(&sample);

        for i in 1..=steps {
            for angle in [i as f32 * step, -(i as f32) * step] {
                let rotated =
                    rotate_about_center(&sample, angle.to_radians(), Interpolation::Nearest, WHITE);
                let score = projection_score(&rotated);
                if score > best_score {
                    best_score = score;
                    best_angle = angle;
                }
            }
        }

        best_angle
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn calculate_resize_dimensions(width: u32, height: u32, target_size: u32) -> (u32, u32) {
    let max_dim = width.max(height);

    if target_size == 0 || max_dim <= target_size {
        return (width, height);
    }

    let scale = target_size as f32 / max_dim as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;

    (new_width.max(1), new_height.max(1))
}

fn skew_sample(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = calculate_resize_dimensions(width, height, SKEW_SAMPLE_SIZE);
    if (w, h) == (width, height) {
        image.clone()
    } else {
        image::imageops::resize(image, w, h, FilterType::Nearest)
    }
}

fn projection_score(image: &GrayImage) -> u64 {
    image
        .rows()
        .map(|row| row.filter(|p| p[0] < 128).count() as u64)
        .map(|dark| dark * dark)
        .sum()
}

/// Mean adaptive threshold: a pixel is white when it is brighter than the
/// mean of its `block_size` neighbourhood minus `offset`.
fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let half_block = block_size / 2;
    let integral: Image<Luma<u64>> = integral_image(image);

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(half_block);
        let y0 = y.saturating_sub(half_block);
        let x1 = (x + half_block).min(width - 1);
        let y1 = (y + half_block).min(height - 1);

        let sum = sum_image_pixels(&integral, x0, y0, x1, y1)[0];
        let count = u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1);

        let threshold = (sum / count) as i32 - offset;
        let value = image.get_pixel(x, y)[0] as i32;

        Luma([if value > threshold { 255 } else { 0 }])
    })
}
