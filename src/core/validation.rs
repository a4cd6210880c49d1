//! Input validation helpers for the pipeline entry points.
//!
//! The core assumes that a page image and its segmentation mask share the
//! same dimensions. That contract is checked once, up front, so that a
//! mismatch fails fast with a clear diagnostic instead of surfacing as a
//! bounds panic deep inside a processing stage.

use crate::core::errors::{LineResult, PageLinesError};
use image::{GrayImage, RgbImage};

/// Validates that an image and its companion mask have identical dimensions.
///
/// # Arguments
///
/// * `image` - The source page image.
/// * `mask` - The segmentation mask produced for that page.
///
/// # Returns
///
/// * `Ok(())` - If both buffers share the same width and height.
/// * `Err(PageLinesError::InvalidInput)` - If the dimensions differ.
pub fn validate_page_pair(image: &RgbImage, mask: &GrayImage) -> LineResult<()> {
    let (iw, ih) = image.dimensions();
    let (mw, mh) = mask.dimensions();

    if (iw, ih) != (mw, mh) {
        return Err(PageLinesError::invalid_input(format!(
            "image is {iw}x{ih} but mask is {mw}x{mh}; both must share dimensions"
        )));
    }

    Ok(())
}

/// Validates that a target canvas size is non-degenerate.
///
/// # Arguments
///
/// * `width` - Target canvas width in pixels.
/// * `height` - Target canvas height in pixels.
///
/// # Returns
///
/// * `Ok(())` - If both dimensions are non-zero.
/// * `Err(PageLinesError::ConfigError)` - If either dimension is zero.
pub fn validate_canvas_size(width: u32, height: u32) -> LineResult<()> {
    if width == 0 || height == 0 {
        return Err(PageLinesError::config_error(format!(
            "target canvas must be non-empty, got {width}x{height}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_dimensions_pass() {
        let image = RgbImage::new(64, 32);
        let mask = GrayImage::new(64, 32);
        assert!(validate_page_pair(&image, &mask).is_ok());
    }

    #[test]
    fn test_mismatched_dimensions_fail() {
        let image = RgbImage::new(64, 32);
        let mask = GrayImage::new(32, 64);
        let err = validate_page_pair(&image, &mask).unwrap_err();
        assert!(err.to_string().contains("invalid input"));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(validate_canvas_size(2000, 80).is_ok());
        assert!(validate_canvas_size(0, 80).is_err());
        assert!(validate_canvas_size(2000, 0).is_err());
    }
}
