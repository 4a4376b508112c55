//! Local and global binarization.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Output polarity of a threshold operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pixels brighter than the threshold become 255 (paper stays white).
    Binary,
    /// Pixels at or below the threshold become 255 (ink becomes foreground).
    Inverted,
}

/// Adaptive mean thresholding using an integral image.
///
/// For each pixel the threshold is the mean over a `block_size × block_size`
/// window (clamped at the borders) minus `offset`.
pub fn adaptive_threshold_mean(
    gray: &GrayImage,
    block_size: u32,
    offset: f32,
    polarity: Polarity,
) -> GrayImage {
    let (w, h) = gray.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let mut out = GrayImage::new(w, h);
    if wu == 0 || hu == 0 {
        return out;
    }

    // integral[(y + 1) * iw + (x + 1)] = sum of gray[0..=y][0..=x]
    let iw = wu + 1;
    let mut integral = vec![0u64; iw * (hu + 1)];
    let raw = gray.as_raw();
    for y in 0..hu {
        let mut row_sum = 0u64;
        for x in 0..wu {
            row_sum += raw[y * wu + x] as u64;
            integral[(y + 1) * iw + (x + 1)] = row_sum + integral[y * iw + (x + 1)];
        }
    }

    let half = (block_size / 2) as usize;
    for y in 0..hu {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(hu - 1) + 1;
        for x in 0..wu {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(wu - 1) + 1;

            let area = ((y1 - y0) * (x1 - x0)) as f64;
            let sum = integral[y1 * iw + x1] + integral[y0 * iw + x0]
                - integral[y0 * iw + x1]
                - integral[y1 * iw + x0];
            let mean = (sum as f64 / area) as f32;

            let value = raw[y * wu + x];
            out.put_pixel(x as u32, y as u32, Luma([classify(value, mean - offset, polarity)]));
        }
    }
    out
}

/// Adaptive thresholding against a Gaussian-weighted local mean.
///
/// The Gaussian sigma is derived from `block_size` the same way a
/// `block_size`-tap kernel would choose it.
pub fn adaptive_threshold_gaussian(
    gray: &GrayImage,
    block_size: u32,
    offset: f32,
    polarity: Polarity,
) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }
    let local_mean = gaussian_blur_f32(gray, sigma_for_block(block_size));
    GrayImage::from_fn(w, h, |x, y| {
        let value = gray.get_pixel(x, y)[0];
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        Luma([classify(value, mean - offset, polarity)])
    })
}

/// Gaussian sigma matching a kernel of `block_size` taps.
pub fn sigma_for_block(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

fn classify(value: u8, threshold: f32, polarity: Polarity) -> u8 {
    let above = value as f32 > threshold;
    match (polarity, above) {
        (Polarity::Binary, true) | (Polarity::Inverted, false) => 255,
        _ => 0,
    }
}

/// Inverts every sample.
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    image::imageops::invert(&mut out);
    out
}

/// Mean sample value; 0 for an empty image.
pub fn mean_intensity(image: &GrayImage) -> f32 {
    let raw = image.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let sum: u64 = raw.iter().map(|&v| v as u64).sum();
    (sum as f64 / raw.len() as f64) as f32
}
