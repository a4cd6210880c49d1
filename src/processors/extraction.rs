//! Line cropping with safety dilation.
//!
//! Each ordered line is rendered onto a page-sized mask, dilated to catch
//! ascenders, descenders, and anti-aliased glyph edges outside the raw
//! contour, and used to cut the tightest non-zero region out of the source
//! image.

use crate::core::errors::{LineResult, PageLinesError, ProcessingStage};
use crate::processors::contours::Line;
use crate::processors::geometry::Contour;
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::dilate;

/// Default dilation factor for line extraction.
pub const DEFAULT_DILATION_FACTOR: f32 = 0.75;

/// Crops one line from the page image using its dilated contour mask.
///
/// A blank single-channel canvas the size of the page receives the filled
/// line contour; that mask is dilated with a square structuring element of
/// side `round(bbox_height * dilation_factor)` and then applied to the
/// image with [`mask_and_crop`]. A factor of 0 skips dilation entirely and
/// yields a crop tightly bounded to the raw contour.
///
/// # Arguments
///
/// * `line` - The line to extract.
/// * `image` - The (rotated) page image; must be the frame the line's
///   contour lives in.
/// * `dilation_factor` - Mask widening relative to the line's bbox height.
///
/// # Returns
///
/// * `Ok(RgbImage)` - The cropped line image.
/// * `Err(PageLinesError)` - If the masked region is empty. This is fatal
///   for the single line only; callers skip the line and continue.
pub fn extract_line(line: &Line, image: &RgbImage, dilation_factor: f32) -> LineResult<RgbImage> {
    let mut canvas = GrayImage::new(image.width(), image.height());
    draw_contour_filled(&mut canvas, &line.contour, Luma([255]));

    let kernel_size = (line.bbox.height as f32 * dilation_factor).round() as i64;
    let radius = (kernel_size / 2).clamp(0, u8::MAX as i64) as u8;
    if radius > 0 {
        canvas = dilate(&canvas, Norm::LInf, radius);
    }

    mask_and_crop(image, &canvas)
}

/// Zeroes every pixel outside the mask, then trims all fully-zero leading
/// and trailing rows and columns.
///
/// # Arguments
///
/// * `image` - The source image.
/// * `mask` - Single-channel mask of identical dimensions; non-zero keeps.
///
/// # Returns
///
/// * `Ok(RgbImage)` - The tight non-zero region of the masked image.
/// * `Err(PageLinesError)` - If no non-zero pixel survives masking.
pub fn mask_and_crop(image: &RgbImage, mask: &GrayImage) -> LineResult<RgbImage> {
    let (width, height) = image.dimensions();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.get_pixel(x, y).0[0] > 0 && pixel.0 != [0, 0, 0] {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return Err(PageLinesError::processing(
            ProcessingStage::LineExtraction,
            format!("masked region of {width}x{height} image is empty"),
        ));
    }

    let mut out = RgbImage::new(max_x - min_x + 1, max_y - min_y + 1);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (sx, sy) = (min_x + x, min_y + y);
        if mask.get_pixel(sx, sy).0[0] > 0 {
            *pixel = *image.get_pixel(sx, sy);
        }
    }

    Ok(out)
}

/// Grayscale companion of [`mask_and_crop`], used when cropping the raw
/// prediction rather than the color page.
pub fn mask_and_crop_gray(image: &GrayImage, mask: &GrayImage) -> LineResult<GrayImage> {
    let (width, height) = image.dimensions();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.get_pixel(x, y).0[0] > 0 && pixel.0[0] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return Err(PageLinesError::processing(
            ProcessingStage::LineExtraction,
            format!("masked region of {width}x{height} mask is empty"),
        ));
    }

    let mut out = GrayImage::new(max_x - min_x + 1, max_y - min_y + 1);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (sx, sy) = (min_x + x, min_y + y);
        if mask.get_pixel(sx, sy).0[0] > 0 {
            *pixel = *image.get_pixel(sx, sy);
        }
    }

    Ok(out)
}

/// Draws a filled contour onto a canvas.
///
/// Contours with fewer than 3 vertices enclose no area and are skipped.
pub fn draw_contour_filled(canvas: &mut GrayImage, contour: &Contour, color: Luma<u8>) {
    if contour.len() < 3 {
        return;
    }

    let mut poly = contour.to_imageproc_points();
    // draw_polygon_mut rejects an explicitly closed polygon.
    if poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        return;
    }

    draw_polygon_mut(canvas, &poly, color);
}

/// Binary dilation with a rectangular structuring element.
///
/// `imageproc`'s `Norm`-based dilate only supports square and diamond
/// elements, so the rectangle is applied as a separable max filter:
/// horizontal window of `kernel_width`, then vertical window of
/// `kernel_height`, anchored like OpenCV's default kernel anchor.
pub fn dilate_rect(mask: &GrayImage, kernel_width: u32, kernel_height: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if kernel_width <= 1 && kernel_height <= 1 {
        return mask.clone();
    }

    let mut horizontal = GrayImage::new(width, height);
    let left = (kernel_width / 2) as i64;
    let right = (kernel_width - 1 - kernel_width / 2) as i64;
    for y in 0..height {
        for x in 0..width {
            let mut max_val = 0u8;
            for dx in -left..=right {
                let sx = x as i64 + dx;
                if sx >= 0 && sx < width as i64 {
                    max_val = max_val.max(mask.get_pixel(sx as u32, y).0[0]);
                }
            }
            horizontal.put_pixel(x, y, Luma([max_val]));
        }
    }

    let mut out = GrayImage::new(width, height);
    let up = (kernel_height / 2) as i64;
    let down = (kernel_height - 1 - kernel_height / 2) as i64;
    for y in 0..height {
        for x in 0..width {
            let mut max_val = 0u8;
            for dy in -up..=down {
                let sy = y as i64 + dy;
                if sy >= 0 && sy < height as i64 {
                    max_val = max_val.max(horizontal.get_pixel(x, sy as u32).0[0]);
                }
            }
            out.put_pixel(x, y, Luma([max_val]));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::contours::{build_lines, extract_contours};
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn page_with_line(x: i32, y: i32, w: u32, h: u32) -> (RgbImage, GrayImage) {
        let mut image = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(w, h), Rgb([200, 180, 160]));
        let mut mask = GrayImage::new(300, 300);
        draw_filled_rect_mut(&mut mask, Rect::at(x, y).of_size(w, h), Luma([255]));
        (image, mask)
    }

    #[test]
    fn test_zero_dilation_is_tight_crop() {
        let (image, mask) = page_with_line(40, 60, 120, 24);
        let lines = build_lines(extract_contours(&mask), true);
        assert_eq!(lines.len(), 1);

        let crop = extract_line(&lines[0], &image, 0.0).unwrap();
        assert_eq!(crop.dimensions(), (120, 24));
        assert_eq!(crop.get_pixel(0, 0).0, [200, 180, 160]);
    }

    #[test]
    fn test_dilation_widens_crop() {
        let (image, mask) = page_with_line(100, 100, 80, 24);
        let lines = build_lines(extract_contours(&mask), true);

        let crop = extract_line(&lines[0], &image, 0.75).unwrap();
        // The dilated mask reaches beyond the rectangle, but those page
        // pixels are black, so the crop stays tight to the painted content.
        assert_eq!(crop.dimensions(), (80, 24));
    }

    #[test]
    fn test_mask_and_crop_trims_zero_borders() {
        let mut image = RgbImage::new(50, 50);
        draw_filled_rect_mut(&mut image, Rect::at(10, 20).of_size(5, 6), Rgb([10, 20, 30]));
        let mask = GrayImage::from_pixel(50, 50, Luma([255]));

        let cropped = mask_and_crop(&image, &mask).unwrap();
        assert_eq!(cropped.dimensions(), (5, 6));
    }

    #[test]
    fn test_mask_and_crop_empty_is_an_error() {
        let image = RgbImage::new(50, 50);
        let mask = GrayImage::new(50, 50);
        assert!(mask_and_crop(&image, &mask).is_err());
    }

    #[test]
    fn test_dilate_rect_grows_vertically() {
        let mut mask = GrayImage::new(21, 21);
        mask.put_pixel(10, 10, Luma([255]));
        let grown = dilate_rect(&mask, 1, 5);
        assert_eq!(grown.get_pixel(10, 8).0[0], 255);
        assert_eq!(grown.get_pixel(10, 12).0[0], 255);
        assert_eq!(grown.get_pixel(8, 10).0[0], 0);
    }
}
