//! Image loading and conversion helpers.

use crate::core::errors::{LineResult, PageLinesError};
use image::{DynamicImage, GrayImage, RgbImage};
use rayon::prelude::*;
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
///
/// The conversion is zero-copy when the image is already RGB8.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Converts a DynamicImage to a single-channel GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

/// Loads an image from a file path and converts it to an RgbImage.
///
/// # Arguments
///
/// * `path` - The path to the image file
///
/// # Returns
///
/// * `Ok(RgbImage)` - The loaded and converted RGB image
/// * `Err(PageLinesError)` - If the image could not be loaded
pub fn load_image(path: &Path) -> LineResult<RgbImage> {
    let img = image::open(path).map_err(PageLinesError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Loads a segmentation mask from a file path as a GrayImage.
///
/// Color masks are collapsed to a single channel.
pub fn load_mask(path: &Path) -> LineResult<GrayImage> {
    let img = image::open(path).map_err(PageLinesError::ImageLoad)?;
    Ok(dynamic_to_gray(img))
}

/// Loads a batch of page images in parallel.
///
/// # Errors
///
/// Fails on the first image that cannot be loaded.
pub fn load_images_batch<P: AsRef<Path> + Send + Sync>(paths: &[P]) -> LineResult<Vec<RgbImage>> {
    paths
        .par_iter()
        .map(|path| load_image(path.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_dynamic_to_rgb_preserves_rgb8() {
        let rgb = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let converted = dynamic_to_rgb(DynamicImage::ImageRgb8(rgb.clone()));
        assert_eq!(converted, rgb);
    }

    #[test]
    fn test_dynamic_to_gray_collapses_channels() {
        let rgb = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let gray = dynamic_to_gray(DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.dimensions(), (4, 4));
        assert_eq!(gray.get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn test_load_image_missing_file_errors() {
        let err = load_image(Path::new("/nonexistent/page.png")).unwrap_err();
        assert!(matches!(err, PageLinesError::ImageLoad(_)));
    }
}
