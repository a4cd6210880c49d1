//! Adaptive line-spacing estimation.
//!
//! Reading-order clustering needs a vertical-distance tolerance that adapts
//! to the page's actual line pitch rather than a hardcoded pixel value.
//! This module samples narrow vertical slices of the mask and derives that
//! tolerance from the most densely populated slice.

use crate::processors::contours::extract_contours;
use crate::processors::geometry::BoundingBox;
use image::{imageops, GrayImage};
use tracing::{debug, warn};

/// Default width of the sampled vertical slices, in pixels.
pub const DEFAULT_SLICE_WIDTH: u32 = 20;

/// Estimates the vertical spacing tolerance between adjacent text lines.
///
/// The bounding rectangle of the mask's foreground is divided into
/// `(width / slice_width) / 2` vertical slices of `slice_width` pixels.
/// The slice intersecting the most connected components is taken as the
/// most representative sample; the estimate is the median of that slice's
/// component y-centers divided by the component count.
///
/// That final division is an empirically tuned scaling, not a statistical
/// spacing measure; downstream clustering behavior depends on it exactly.
///
/// # Arguments
///
/// * `mask` - Binary segmentation mask.
/// * `slice_width` - Width of each sampled slice in pixels.
///
/// # Returns
///
/// The spacing tolerance in pixels, or 0.0 when the mask has no foreground
/// or the reference slice contains no components. A zero tolerance makes
/// every bounding box its own line downstream, which is the accepted
/// degenerate fallback.
pub fn estimate_line_spacing(mask: &GrayImage, slice_width: u32) -> f32 {
    let Some(rect) = foreground_bounding_rect(mask) else {
        debug!("mask has no foreground, spacing tolerance is 0");
        return 0.0;
    };

    let x_steps = (rect.width as u32 / slice_width.max(1)) / 2;

    let mut slice_counts: Vec<(usize, Vec<i32>)> = Vec::new();

    for step in 1..=x_steps {
        // The stride equals the slice count; inherited sampling layout that
        // the tolerance scaling was tuned against.
        let x_offset = x_steps * step;
        let x_start = rect.x as u32 + x_offset;
        let x_end = (x_start + slice_width).min(mask.width());
        if x_start >= x_end {
            continue;
        }

        let slice = imageops::crop_imm(
            mask,
            x_start,
            rect.y as u32,
            x_end - x_start,
            rect.height as u32,
        )
        .to_image();

        let y_centers: Vec<i32> = extract_contours(&slice)
            .iter()
            .map(|c| {
                let bbox = c.bounding_rect();
                bbox.y + bbox.height / 2
            })
            .collect();

        slice_counts.push((y_centers.len(), y_centers));
    }

    // First slice with the maximum component count wins ties.
    let Some((count, y_centers)) = slice_counts
        .into_iter()
        .fold(None, |best: Option<(usize, Vec<i32>)>, next| match best {
            Some(b) if b.0 >= next.0 => Some(b),
            _ => Some(next),
        })
    else {
        return 0.0;
    };

    if count == 0 {
        warn!("reference slice contains no components, spacing tolerance is 0");
        return 0.0;
    }

    let threshold = (median(y_centers) / count as f64).floor() as f32;
    debug!(count, threshold, "estimated line spacing tolerance");
    threshold
}

/// Bounding rectangle of all non-zero pixels, or `None` for an empty mask.
fn foreground_bounding_rect(mask: &GrayImage) -> Option<BoundingBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| {
        BoundingBox::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        )
    })
}

fn median(mut values: Vec<i32>) -> f64 {
    values.sort_unstable();
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2] as f64
    } else {
        (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_empty_mask_yields_zero() {
        let mask = GrayImage::new(500, 500);
        assert_eq!(estimate_line_spacing(&mask, DEFAULT_SLICE_WIDTH), 0.0);
    }

    #[test]
    fn test_three_even_lines() {
        let mut mask = GrayImage::new(1000, 1000);
        for row in 0..3 {
            draw_filled_rect_mut(
                &mut mask,
                Rect::at(100, 100 + row * 200).of_size(400, 20),
                Luma([255]),
            );
        }

        // Every slice crosses all three lines; local y-centers sit near 10,
        // 210 and 410 within the foreground rect, so the estimate is
        // median(210) / 3 = 70.
        let spacing = estimate_line_spacing(&mask, DEFAULT_SLICE_WIDTH);
        assert!((spacing - 70.0).abs() <= 1.0, "spacing was {spacing}");
    }

    #[test]
    fn test_narrow_mask_yields_zero() {
        // Foreground narrower than one slice stride: no slices to sample.
        let mut mask = GrayImage::new(500, 500);
        draw_filled_rect_mut(&mut mask, Rect::at(10, 10).of_size(30, 60), Luma([255]));
        assert_eq!(estimate_line_spacing(&mask, DEFAULT_SLICE_WIDTH), 0.0);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(vec![10, 20, 30, 40]), 25.0);
        assert_eq!(median(vec![7]), 7.0);
    }
}
