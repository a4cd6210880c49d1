//! Skew estimation and correction.
//!
//! A scanned page is rarely perfectly level. This module estimates the
//! residual rotation of a page from the line-shaped regions of its
//! segmentation mask and applies the correcting rotation to images, masks,
//! and contours.
//!
//! The estimator assumes the dominant population of line-shaped regions
//! shares a common orientation. Pages with very few lines or strongly
//! curved text will under- or mis-correct; that is a known limitation of
//! the heuristic, not a handled case.

use crate::processors::contours::extract_contours;
use crate::processors::geometry::{cart2pol, pol2cart, Contour, Point};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use tracing::debug;

/// Default cap on the skew magnitude the estimator will report, in degrees.
pub const DEFAULT_MAX_SKEW_ANGLE: f32 = 5.0;

/// Fraction of the mask's pixel area below which a contour is treated as
/// noise. Proportional so the floor scales with image resolution.
const NOISE_AREA_RATIO: f32 = 0.001;

/// Estimates the rotation angle that best levels the text lines of a mask.
///
/// Contours are extracted from the mask and filtered against a noise floor
/// of 0.1% of the mask's pixel area. The min-area-rect orientation of each
/// survivor is partitioned into near-horizontal ("low") and near-vertical
/// ("high") populations; the dominant population decides the sign and
/// magnitude of the estimate.
///
/// # Arguments
///
/// * `mask` - Binary segmentation mask (non-zero = line foreground).
/// * `max_angle` - Maximum skew magnitude considered plausible, in degrees.
///
/// # Returns
///
/// The estimated skew in degrees. Positive values mean the page needs a
/// counter-clockwise correction (in screen coordinates). Returns 0.0 when
/// no confident skew signal exists, including the case of zero surviving
/// contours.
pub fn estimate_skew_angle(mask: &GrayImage, max_angle: f32) -> f32 {
    let noise_floor = (mask.width() * mask.height()) as f32 * NOISE_AREA_RATIO;

    let angles: Vec<f32> = extract_contours(mask)
        .into_iter()
        .filter(|c| c.area() > noise_floor)
        .map(|c| c.min_area_rect().angle)
        .collect();

    // Exact zero/ninety are axis-aligned rectangles with no skew signal;
    // they are excluded from both populations.
    let low_angles: Vec<f32> = angles
        .iter()
        .copied()
        .filter(|&a| a.abs() != 0.0 && a < max_angle)
        .collect();
    let high_angles: Vec<f32> = angles
        .iter()
        .copied()
        .filter(|&a| a.abs() != 90.0 && a > 90.0 - max_angle)
        .collect();

    debug!(
        total = angles.len(),
        low = low_angles.len(),
        high = high_angles.len(),
        "skew angle populations"
    );

    if low_angles.len() > high_angles.len() && !low_angles.is_empty() {
        mean(&low_angles)
    } else if !high_angles.is_empty() {
        // Near-vertical orientation flags clockwise skew.
        -(90.0 - mean(&high_angles))
    } else {
        0.0
    }
}

/// Rotates a color image about its center, keeping the canvas size.
///
/// Out-of-frame pixels are filled with black, and interpolation is
/// bilinear. Positive angles rotate counter-clockwise in screen
/// coordinates, matching the sign convention of [`estimate_skew_angle`].
pub fn rotate_rgb(image: &RgbImage, angle_degrees: f32) -> RgbImage {
    rotate_about_center(
        image,
        -angle_degrees.to_radians(),
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
    )
}

/// Rotates a grayscale image about its center, keeping the canvas size.
///
/// Companion to [`rotate_rgb`]: when a page image and its mask are rotated
/// for the same page they must both go through this pair so the transform
/// is applied identically.
pub fn rotate_gray(image: &GrayImage, angle_degrees: f32) -> GrayImage {
    rotate_about_center(
        image,
        -angle_degrees.to_radians(),
        Interpolation::Bilinear,
        Luma([0]),
    )
}

/// Rotates a contour about an explicit pivot point.
///
/// Each vertex is translated into the pivot frame, converted to polar
/// coordinates, advanced by the angle, and converted back. The pivot is
/// deliberately a parameter rather than the image center: when re-aligning
/// a text-region contour to a rotated frame the pivot is the contour's own
/// moment centroid.
///
/// # Arguments
///
/// * `contour` - The polygon to rotate.
/// * `pivot` - Pivot point of the rotation.
/// * `angle_degrees` - Rotation angle in degrees.
pub fn rotate_contour(contour: &Contour, pivot: (f32, f32), angle_degrees: f32) -> Contour {
    let (cx, cy) = pivot;

    let points = contour
        .points
        .iter()
        .map(|p| {
            let (theta, rho) = cart2pol(p.x as f32 - cx, p.y as f32 - cy);
            let theta = (theta.to_degrees() + angle_degrees).rem_euclid(360.0).to_radians();
            let (x, y) = pol2cart(theta, rho);
            Point::new((x + cx).round() as i32, (y + cy).round() as i32)
        })
        .collect();

    Contour::new(points)
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point as ImageProcPoint;
    use imageproc::rect::Rect;

    fn draw_tilted_line(mask: &mut GrayImage, x: f32, y: f32, length: f32, height: f32, deg: f32) {
        let theta = deg.to_radians();
        let (dx, dy) = (theta.cos(), theta.sin());
        let (nx, ny) = (-dy, dx);
        let corners = [
            (x, y),
            (x + length * dx, y + length * dy),
            (x + length * dx + height * nx, y + length * dy + height * ny),
            (x + height * nx, y + height * ny),
        ];
        let poly: Vec<ImageProcPoint<i32>> = corners
            .iter()
            .map(|&(px, py)| ImageProcPoint::new(px.round() as i32, py.round() as i32))
            .collect();
        draw_polygon_mut(mask, &poly, Luma([255]));
    }

    #[test]
    fn test_level_lines_report_zero() {
        let mut mask = GrayImage::new(1000, 1000);
        for row in 0..3 {
            imageproc::drawing::draw_filled_rect_mut(
                &mut mask,
                Rect::at(100, 100 + row * 200).of_size(400, 20),
                Luma([255]),
            );
        }
        let angle = estimate_skew_angle(&mask, DEFAULT_MAX_SKEW_ANGLE);
        assert!(angle.abs() < 0.1, "angle was {angle}");
    }

    #[test]
    fn test_empty_mask_reports_zero() {
        let mask = GrayImage::new(400, 400);
        assert_eq!(estimate_skew_angle(&mask, DEFAULT_MAX_SKEW_ANGLE), 0.0);
    }

    #[test]
    fn test_recovers_counter_clockwise_skew() {
        let mut mask = GrayImage::new(1000, 1000);
        for row in 0..4 {
            draw_tilted_line(&mut mask, 100.0, 100.0 + row as f32 * 180.0, 600.0, 20.0, 2.0);
        }
        let angle = estimate_skew_angle(&mask, DEFAULT_MAX_SKEW_ANGLE);
        assert!((angle - 2.0).abs() < 0.5, "angle was {angle}");
    }

    #[test]
    fn test_recovers_clockwise_skew() {
        let mut mask = GrayImage::new(1000, 1000);
        for row in 0..4 {
            draw_tilted_line(&mut mask, 100.0, 150.0 + row as f32 * 180.0, 600.0, 20.0, -2.0);
        }
        let angle = estimate_skew_angle(&mask, DEFAULT_MAX_SKEW_ANGLE);
        assert!((angle + 2.0).abs() < 0.5, "angle was {angle}");
    }

    #[test]
    fn test_speckle_noise_is_ignored() {
        let mut mask = GrayImage::new(1000, 1000);
        // A handful of tiny blobs, all below the 0.1% area floor.
        for i in 0..5 {
            imageproc::drawing::draw_filled_rect_mut(
                &mut mask,
                Rect::at(50 + i * 100, 50).of_size(8, 8),
                Luma([255]),
            );
        }
        assert_eq!(estimate_skew_angle(&mask, DEFAULT_MAX_SKEW_ANGLE), 0.0);
    }

    #[test]
    fn test_rotation_round_trip_is_approximate_identity() {
        let mut image = GrayImage::new(200, 200);
        imageproc::drawing::draw_filled_rect_mut(
            &mut image,
            Rect::at(60, 80).of_size(80, 40),
            Luma([255]),
        );
        let there = rotate_gray(&image, 3.0);
        let back = rotate_gray(&there, -3.0);

        // Interior of the rectangle survives; far corners stay background.
        assert_eq!(back.get_pixel(100, 100).0[0], 255);
        assert_eq!(back.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_rotate_contour_about_pivot() {
        let contour = Contour::new(vec![
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ]);
        let rotated = rotate_contour(&contour, (0.0, 0.0), 90.0);
        // 90 degrees in polar space maps (x, y) to (-y, x).
        assert_eq!(rotated.points[0], Point::new(0, 10));
        assert_eq!(rotated.points[2], Point::new(-10, 0));
    }
}
