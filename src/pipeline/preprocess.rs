//! # Stage Definition: Image Preprocessing
//!
//! - **Inputs**: raw image bytes, an image path, or an already decoded `GrayImage`.
//! - **Outputs**: a denoised, deskewed `GrayImage` of the same size as the input.
//! - **Logging**: traces the estimated skew angle, or why deskew was skipped.
//! - **Error Behavior**: only decoding can fail (`OCRError::ImageLoad`); finding
//!   no usable lines is not an error and leaves the image unrotated.

use crate::core::{OcrResult, ProcessingStage};
use crate::core::config::PreprocessConfig;
use crate::utils::{decode_gray_image, load_gray_image};
use image::{GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::hough::{LineDetectionOptions, detect_lines};
use std::path::Path;
use tracing::{debug, instrument};

/// Grayscale conversion, denoising and automatic deskew.
#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Decodes `bytes` and preprocesses the result.
    pub fn process_bytes(&self, bytes: &[u8]) -> OcrResult<GrayImage> {
        Ok(self.process(decode_gray_image(bytes)?))
    }

    /// Loads the image at `path` and preprocesses it.
    pub fn process_path(&self, path: &Path) -> OcrResult<GrayImage> {
        Ok(self.process(load_gray_image(path)?))
    }

    /// Denoises and deskews a grayscale page.
    #[instrument(skip_all, name = "preprocess")]
    pub fn process(&self, gray: GrayImage) -> GrayImage {
        let denoised = if self.config.denoise_radius > 0 {
            median_filter(&gray, self.config.denoise_radius, self.config.denoise_radius)
        } else {
            gray
        };

        if !self.config.deskew {
            return denoised;
        }
        match self.estimate_skew(&denoised) {
            Some(angle) if angle != 0.0 => {
                debug!(angle, "deskewing page");
                rotate_about_center_replicate(&denoised, angle)
            }
            Some(_) => denoised,
            None => {
                debug!(
                    stage = %ProcessingStage::Preprocessing,
                    "no near-horizontal lines found; skipping deskew"
                );
                denoised
            }
        }
    }

    /// Estimates page skew in degrees (positive = counter-clockwise
    /// correction) as the median offset from horizontal of the detected
    /// straight lines. Returns `None` when no line qualifies.
    pub fn estimate_skew(&self, gray: &GrayImage) -> Option<f32> {
        if gray.width() == 0 || gray.height() == 0 {
            return None;
        }
        let edges = canny(gray, self.config.canny_low, self.config.canny_high);
        let lines = detect_lines(
            &edges,
            LineDetectionOptions {
                vote_threshold: self.config.hough_vote_threshold,
                suppression_radius: self.config.hough_suppression_radius,
            },
        );

        // The line normal is at `angle_in_degrees`; a horizontal line has a
        // vertical normal (90°).
        let offsets: Vec<f32> = lines
            .iter()
            .map(|line| line.angle_in_degrees as f32 - 90.0)
            .filter(|offset| offset.abs() <= self.config.max_skew_degrees)
            .collect();
        debug!(lines = lines.len(), qualifying = offsets.len(), "hough lines");
        median_f32(offsets)
    }
}

fn median_f32(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Rotates `image` counter-clockwise by `angle_degrees` about
/// `(width / 2, height / 2)`, keeping the original size. Uses bicubic
/// interpolation; samples outside the source repeat the nearest edge pixel.
pub fn rotate_about_center_replicate(image: &GrayImage, angle_degrees: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    let cx = (w / 2) as f32;
    let cy = (h / 2) as f32;
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    GrayImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        Luma([sample_bicubic_replicate(image, sx, sy)])
    })
}

fn cubic_weights(t: f32) -> [f32; 4] {
    const A: f32 = -0.75;
    let w0 = ((A * (t + 1.0) - 5.0 * A) * (t + 1.0) + 8.0 * A) * (t + 1.0) - 4.0 * A;
    let w1 = ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0;
    let w2 = ((A + 2.0) * (1.0 - t) - (A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}

fn sample_bicubic_replicate(image: &GrayImage, x: f32, y: f32) -> u8 {
    let (w, h) = image.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);
    let clamp_x = |v: i64| v.clamp(0, w as i64 - 1) as u32;
    let clamp_y = |v: i64| v.clamp(0, h as i64 - 1) as u32;

    let mut acc = 0.0f32;
    for (j, wyj) in wy.iter().enumerate() {
        let sy = clamp_y(y0 as i64 - 1 + j as i64);
        for (i, wxi) in wx.iter().enumerate() {
            let sx = clamp_x(x0 as i64 - 1 + i as i64);
            acc += wxi * wyj * image.get_pixel(sx, sy)[0] as f32;
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruled_page(width: u32, height: u32, spacing: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |_, y| {
            if y % spacing < 2 && y > 10 && y < height - 10 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let img = GrayImage::from_fn(16, 9, |x, y| Luma([(x * 13 + y * 7) as u8]));
        assert_eq!(rotate_about_center_replicate(&img, 0.0), img);
    }

    #[test]
    fn test_rotation_replicates_edges() {
        let img = GrayImage::from_pixel(20, 20, Luma([200]));
        let rotated = rotate_about_center_replicate(&img, 10.0);
        assert!(rotated.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn test_cubic_weights_sum_to_one() {
        for t in [0.0, 0.25, 0.5, 0.9] {
            let sum: f32 = cubic_weights(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
        assert_eq!(cubic_weights(0.0)[1], 1.0);
    }

    #[test]
    fn test_blank_page_is_left_unrotated() {
        let page = GrayImage::from_pixel(120, 80, Luma([255]));
        let pre = ImagePreprocessor::default();
        assert_eq!(pre.estimate_skew(&page), None);
        assert_eq!(pre.process(page.clone()), page);
    }

    #[test]
    fn test_level_lines_have_no_skew() {
        let page = ruled_page(400, 300, 40);
        let pre = ImagePreprocessor::new(PreprocessConfig {
            denoise_radius: 0,
            ..PreprocessConfig::default()
        });
        assert_eq!(pre.estimate_skew(&page), Some(0.0));
        assert_eq!(pre.process(page.clone()), page);
    }

    #[test]
    fn test_tilted_page_is_straightened() {
        let pre = ImagePreprocessor::new(PreprocessConfig {
            denoise_radius: 0,
            ..PreprocessConfig::default()
        });
        let tilted = rotate_about_center_replicate(&ruled_page(400, 300, 40), 3.0);

        let angle = pre.estimate_skew(&tilted).unwrap();
        assert!((angle + 3.0).abs() <= 1.0, "estimated {angle}");

        let straightened = pre.process(tilted);
        let residual = pre.estimate_skew(&straightened).unwrap();
        assert!(residual.abs() <= 1.0, "residual {residual}");
    }

    #[test]
    fn test_median_f32() {
        assert_eq!(median_f32(vec![]), None);
        assert_eq!(median_f32(vec![3.0, -1.0, 2.0]), Some(2.0));
        assert_eq!(median_f32(vec![1.0, 2.0]), Some(1.5));
    }
}
