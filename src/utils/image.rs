//! Image loading, cropping and resizing helpers.

use crate::core::OCRError;
use crate::processors::CellBox;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::filter::gaussian_blur_f32;
use std::path::Path;

/// Sigma equivalent to a 3×3 Gaussian kernel.
const SOFT_BLUR_SIGMA: f32 = 0.8;

/// Converts a DynamicImage to a single-channel 8-bit image.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

/// Loads an image file and converts it to grayscale.
///
/// # Errors
///
/// Returns `OCRError::ImageLoad` if the file is missing or cannot be decoded.
pub fn load_gray_image(path: &Path) -> Result<GrayImage, OCRError> {
    let img = image::open(path).map_err(|source| OCRError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(dynamic_to_gray(img))
}

/// Decodes an in-memory image and converts it to grayscale.
pub fn decode_gray_image(bytes: &[u8]) -> Result<GrayImage, OCRError> {
    let img = image::load_from_memory(bytes).map_err(|source| OCRError::ImageLoad {
        path: "<memory>".into(),
        source,
    })?;
    Ok(dynamic_to_gray(img))
}

/// Copies the region covered by `bbox` out of `image`.
///
/// `bbox` must lie inside the image; use [`CellBox::inset`] to clip first.
pub fn crop_gray(image: &GrayImage, bbox: &CellBox) -> GrayImage {
    imageops::crop_imm(image, bbox.x, bbox.y, bbox.width, bbox.height).to_image()
}

/// Enlarges `image` so that its longer side reaches `target`, keeping the
/// aspect ratio. Images already close to or above the target are returned
/// unchanged.
pub fn upscale_to(image: &GrayImage, target: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    let longer = w.max(h);
    if longer == 0 {
        return image.clone();
    }
    let factor = (target as f64 / longer as f64).max(1.0);
    if factor <= 1.01 {
        return image.clone();
    }
    let new_w = ((w as f64 * factor).round() as u32).max(1);
    let new_h = ((h as f64 * factor).round() as u32).max(1);
    imageops::resize(image, new_w, new_h, FilterType::CatmullRom)
}

/// Light Gaussian smoothing used before re-reading hard-to-read crops.
pub fn soften(image: &GrayImage) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    gaussian_blur_f32(image, SOFT_BLUR_SIGMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_upscale_reaches_target_on_longer_side() {
        let img = GrayImage::from_pixel(20, 10, Luma([128]));
        let up = upscale_to(&img, 60);
        assert_eq!(up.dimensions(), (60, 30));
    }

    #[test]
    fn test_upscale_leaves_large_images() {
        let img = GrayImage::from_pixel(80, 10, Luma([128]));
        assert_eq!(upscale_to(&img, 60).dimensions(), (80, 10));
        let near = GrayImage::from_pixel(100, 10, Luma([128]));
        assert_eq!(upscale_to(&near, 101).dimensions(), (100, 10));
    }

    #[test]
    fn test_crop_gray() {
        let img = GrayImage::from_fn(10, 10, |x, y| Luma([(x + 10 * y) as u8]));
        let crop = crop_gray(&img, &CellBox::new(2, 3, 4, 2));
        assert_eq!(crop.dimensions(), (4, 2));
        assert_eq!(crop.get_pixel(0, 0)[0], 32);
    }

    #[test]
    fn test_load_missing_file_is_image_load_error() {
        let err = load_gray_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, OCRError::ImageLoad { .. }));
    }

    #[test]
    fn test_decode_converts_to_gray() {
        let rgb = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let gray = decode_gray_image(bytes.get_ref()).unwrap();
        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_gray_image(b"not an image").is_err());
    }
}
