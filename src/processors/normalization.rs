//! Fixed-canvas normalization for the recognition model.
//!
//! Line crops come out of extraction at arbitrary sizes; the recognizer
//! wants a fixed canvas (2000x80 by default). The crop is resized
//! preserving its aspect ratio along the tighter dimension, padded
//! symmetrically on the other, and finally force-resized to the exact
//! target. That last pass can introduce minor distortion when the two
//! scale ratios were close but unequal; accepted trade-off for fixed-size
//! model input.

use crate::core::errors::LineResult;
use crate::core::validation::validate_canvas_size;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::contrast::{adaptive_threshold, threshold, ThresholdType};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Default recognizer canvas width.
pub const DEFAULT_TARGET_WIDTH: u32 = 2000;
/// Default recognizer canvas height.
pub const DEFAULT_TARGET_HEIGHT: u32 = 80;

/// Constant fill used for canvas padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingFill {
    /// Pad with black pixels.
    #[default]
    Black,
    /// Pad with white pixels.
    White,
}

impl PaddingFill {
    fn rgb(self) -> Rgb<u8> {
        match self {
            PaddingFill::Black => Rgb([0, 0, 0]),
            PaddingFill::White => Rgb([255, 255, 255]),
        }
    }
}

/// Resizes an image to a target height, preserving aspect ratio.
///
/// # Returns
///
/// The resized image and the scale ratio that was applied.
pub fn resize_to_height(image: &RgbImage, target_height: u32) -> (RgbImage, f32) {
    let ratio = target_height as f32 / image.height() as f32;
    let width = ((image.width() as f32 * ratio) as u32).max(1);
    (
        imageops::resize(image, width, target_height, FilterType::Triangle),
        ratio,
    )
}

/// Resizes an image to a target width, preserving aspect ratio.
///
/// # Returns
///
/// The resized image and the scale ratio that was applied.
pub fn resize_to_width(image: &RgbImage, target_width: u32) -> (RgbImage, f32) {
    let ratio = target_width as f32 / image.width() as f32;
    let height = ((image.height() as f32 * ratio) as u32).max(1);
    (
        imageops::resize(image, target_width, height, FilterType::Triangle),
        ratio,
    )
}

/// Scales the image to the full target width and pads top/bottom to reach
/// the target height.
fn pad_to_width(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    fill: PaddingFill,
) -> RgbImage {
    let (resized, _) = resize_to_width(image, target_width);
    let top = (target_height.saturating_sub(resized.height())) / 2;

    let mut canvas = RgbImage::from_pixel(target_width, target_height, fill.rgb());
    imageops::overlay(&mut canvas, &resized, 0, top as i64);
    canvas
}

/// Scales the image to the full target height and pads left/right to reach
/// the target width.
fn pad_to_height(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    fill: PaddingFill,
) -> RgbImage {
    let (resized, _) = resize_to_height(image, target_height);
    let left = (target_width.saturating_sub(resized.width())) / 2;

    let mut canvas = RgbImage::from_pixel(target_width, target_height, fill.rgb());
    imageops::overlay(&mut canvas, &resized, left as i64, 0);
    canvas
}

/// Normalizes a line crop onto the fixed recognizer canvas.
///
/// The crop is scaled along whichever dimension has the smaller target
/// ratio (so it fits inside the canvas), padded symmetrically on the other
/// dimension with `fill`, and force-resized to the exact target as a final
/// pass.
///
/// # Arguments
///
/// * `image` - The extracted line crop.
/// * `target_width` - Target canvas width.
/// * `target_height` - Target canvas height.
/// * `fill` - Padding fill color.
///
/// # Returns
///
/// * `Ok(RgbImage)` - An image of exactly `target_width x target_height`.
/// * `Err(PageLinesError)` - If the target canvas is degenerate.
pub fn pad_ocr_line(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    fill: PaddingFill,
) -> LineResult<RgbImage> {
    validate_canvas_size(target_width, target_height)?;

    let width_ratio = target_width as f32 / image.width() as f32;
    let height_ratio = target_height as f32 / image.height() as f32;

    let padded = if width_ratio <= height_ratio {
        pad_to_width(image, target_width, target_height, fill)
    } else {
        pad_to_height(image, target_width, target_height, fill)
    };

    Ok(imageops::resize(
        &padded,
        target_width,
        target_height,
        FilterType::Triangle,
    ))
}

/// Neighborhood radius for adaptive binarization.
const ADAPTIVE_BLOCK_RADIUS: u32 = 25;
/// Cutoff for global binarization.
const GLOBAL_THRESHOLD: u8 = 120;

/// Binarizes a line image for recognition models trained on binary input.
///
/// Adaptive mode thresholds each pixel against its local neighborhood mean,
/// which tolerates uneven page illumination; global mode applies a fixed
/// cutoff. The result keeps three channels so it feeds the same
/// normalization path as the untouched crop.
pub fn binarize(image: &RgbImage, adaptive: bool) -> RgbImage {
    let gray: GrayImage = imageops::grayscale(image);

    let bw = if adaptive {
        adaptive_threshold(&gray, ADAPTIVE_BLOCK_RADIUS)
    } else {
        threshold(&gray, GLOBAL_THRESHOLD, ThresholdType::Binary)
    };

    DynamicImage::ImageLuma8(bw).to_rgb8()
}

/// Converts a normalized line image to the recognizer's input tensor.
///
/// The image is collapsed to a single channel and scaled into `[0, 1]`,
/// shaped `(1, height, width)`.
pub fn prepare_recognizer_input(image: &RgbImage) -> Array3<f32> {
    let gray: GrayImage = imageops::grayscale(image);
    let (width, height) = gray.dimensions();

    Array3::from_shape_fn((1, height as usize, width as usize), |(_, y, x)| {
        gray.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0
    })
}
