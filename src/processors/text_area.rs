//! Text-area localization and page deskewing.
//!
//! Before line detection the page is reduced to its dominant text region:
//! the raw segmentation output is dilated until neighboring lines fuse into
//! one blob, the largest blob wins, and everything else on the page
//! (marginalia, smudges, ornamentation) is ignored from then on. The page
//! and its prediction are then leveled with the skew estimate of that
//! region alone.

use crate::processors::contours::extract_contours;
use crate::processors::extraction::{dilate_rect, mask_and_crop_gray};
use crate::processors::geometry::Contour;
use crate::processors::skew::{estimate_skew_angle, rotate_contour, rotate_gray, rotate_rgb};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, warn};

/// Structuring element width used to fuse the prediction into area blobs.
const FUSE_KERNEL_WIDTH: u32 = 2;
/// Structuring element height used to fuse the prediction into area blobs.
const FUSE_KERNEL_HEIGHT: u32 = 12;
/// Number of fuse-dilation passes.
const FUSE_ITERATIONS: u32 = 10;

/// Result of text-area localization.
#[derive(Debug, Clone)]
pub enum TextArea {
    /// A dominant text region was found.
    Found {
        /// The prediction resized to the page's dimensions.
        prediction: GrayImage,
        /// Filled rectangular mask covering the region, page-sized.
        mask: GrayImage,
        /// Outline of the fused region blob.
        contour: Contour,
    },
    /// The prediction contains no foreground at all.
    NotFound,
}

/// Result of deskewing a page against its text area.
#[derive(Debug, Clone)]
pub enum DeskewedPage {
    /// The page was leveled.
    Found {
        /// The rotated page image.
        image: RgbImage,
        /// The rotated, page-sized prediction.
        prediction: GrayImage,
        /// The text-area outline, re-aligned to the rotated frame.
        contour: Contour,
        /// The applied rotation in degrees.
        angle: f32,
    },
    /// No text area exists, or its geometry is too degenerate to anchor a
    /// rotation.
    NotFound,
}

/// Locates the dominant text region of a page.
///
/// The raw prediction is dilated with a tall, narrow structuring element
/// until vertically adjacent lines fuse into contiguous blobs, both the
/// prediction and its fused version are resized to the page's dimensions,
/// and the largest fused blob becomes the text area. Its bounding rectangle
/// is rendered as a filled page-sized mask.
///
/// # Arguments
///
/// * `image` - The page image; only its dimensions are used.
/// * `prediction` - Raw segmentation output, any resolution.
///
/// # Returns
///
/// [`TextArea::Found`] with the resized prediction, the area mask, and the
/// winning blob's contour, or [`TextArea::NotFound`] when the fused
/// prediction has no contours.
pub fn get_text_area(image: &RgbImage, prediction: &GrayImage) -> TextArea {
    let mut fused = prediction.clone();
    for _ in 0..FUSE_ITERATIONS {
        fused = dilate_rect(&fused, FUSE_KERNEL_WIDTH, FUSE_KERNEL_HEIGHT);
    }

    let (width, height) = image.dimensions();
    let prediction = imageops::resize(prediction, width, height, FilterType::Triangle);
    let fused = imageops::resize(&fused, width, height, FilterType::Triangle);

    let blobs = extract_contours(&fused);
    let Some(biggest) = blobs
        .into_iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
    else {
        debug!("prediction has no fused blobs, no text area");
        return TextArea::NotFound;
    };

    let bbox = biggest.bounding_rect();
    let mut mask = GrayImage::new(width, height);
    draw_filled_rect_mut(
        &mut mask,
        Rect::at(bbox.x, bbox.y).of_size(bbox.width.max(1) as u32, bbox.height.max(1) as u32),
        Luma([255]),
    );

    TextArea::Found {
        prediction,
        mask,
        contour: biggest,
    }
}

/// Keeps only the line contours whose min-area-rect center falls inside
/// the text area's bounding rectangle.
///
/// # Arguments
///
/// * `prediction` - Page-sized segmentation prediction.
/// * `text_area` - The text-area outline from [`get_text_area`].
pub fn filter_contours(prediction: &GrayImage, text_area: &Contour) -> Vec<Contour> {
    let bbox = text_area.bounding_rect();

    extract_contours(prediction)
        .into_iter()
        .filter(|contour| {
            let (cx, cy) = contour.min_area_rect().center;
            bbox.contains(cx, cy)
        })
        .collect()
}

/// Levels a page against the skew of its text area.
///
/// The prediction is cropped to the area mask, the skew estimate is taken
/// from that crop alone, and the correcting rotation is applied to the
/// page, the prediction, and the area contour. The contour pivots about its
/// own moment centroid so it stays registered with the region it outlines.
///
/// # Arguments
///
/// * `image` - The page image.
/// * `prediction` - Raw segmentation output, any resolution.
/// * `max_angle` - Maximum plausible skew in degrees.
///
/// # Returns
///
/// [`DeskewedPage::Found`] with the rotated image, prediction, re-aligned
/// contour, and applied angle. [`DeskewedPage::NotFound`] when no text area
/// exists or the area contour has no moment centroid.
pub fn deskew_page(image: &RgbImage, prediction: &GrayImage, max_angle: f32) -> DeskewedPage {
    let TextArea::Found {
        prediction,
        mask,
        contour,
    } = get_text_area(image, prediction)
    else {
        return DeskewedPage::NotFound;
    };

    let angle = match mask_and_crop_gray(&prediction, &mask) {
        Ok(cropped) => estimate_skew_angle(&cropped, max_angle),
        Err(err) => {
            warn!(%err, "text area mask covers no prediction foreground");
            return DeskewedPage::NotFound;
        }
    };

    let Some(centroid) = contour.centroid() else {
        warn!("text area contour has no moment centroid");
        return DeskewedPage::NotFound;
    };

    debug!(angle, "deskewing page");

    DeskewedPage::Found {
        image: rotate_rgb(image, angle),
        prediction: rotate_gray(&prediction, angle),
        contour: rotate_contour(&contour, centroid, angle),
        angle,
    }
}
