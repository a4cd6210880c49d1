//! End-to-end line detection pipeline.
//!
//! Wires the processing stages together: skew correction, contour
//! extraction, spacing estimation, reading-order clustering, chunk
//! merging, line cropping, and recognizer-input normalization.

pub mod config;

pub use config::PipelineConfig;

use crate::core::errors::LineResult;
use crate::core::validation::validate_page_pair;
use crate::processors::contours::{build_lines, extract_contours, Line};
use crate::processors::extraction::extract_line;
use crate::processors::normalization::{pad_ocr_line, prepare_recognizer_input};
use crate::processors::ordering::{cluster_centers, group_line_chunks, LineCenter};
use crate::processors::skew::{estimate_skew_angle, rotate_gray, rotate_rgb};
use crate::processors::spacing::estimate_line_spacing;
use crate::processors::text_area::{deskew_page, filter_contours, DeskewedPage};
use image::{GrayImage, RgbImage};
use ndarray::Array3;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of running line detection on one page.
#[derive(Debug, Clone)]
pub struct LineData {
    /// The page image, rotated into the leveled frame.
    pub image: RgbImage,
    /// The segmentation mask, rotated identically.
    pub mask: GrayImage,
    /// The rotation that was applied, in degrees.
    pub rotation_angle: f32,
    /// Detected lines in reading order: top-to-bottom, left-to-right.
    pub lines: Vec<Line>,
}

/// Detects text lines on a page from its segmentation mask.
///
/// The mask decides the skew correction; image and mask are rotated
/// identically so the returned line geometry is valid in the returned
/// image's frame. Line candidates are clustered into rows with a spacing
/// tolerance estimated from the mask itself, and same-row chunks are merged
/// when `group_chunks` is enabled.
///
/// # Arguments
///
/// * `image` - The page image.
/// * `mask` - Binary line segmentation mask of identical dimensions.
/// * `config` - Pipeline parameters.
///
/// # Returns
///
/// * `Ok(LineData)` - Rotated page, mask, and ordered lines. A mask with no
///   usable lines yields an empty line list, not an error.
/// * `Err(PageLinesError)` - If the image and mask dimensions disagree.
pub fn detect_lines(
    image: &RgbImage,
    mask: &GrayImage,
    config: &PipelineConfig,
) -> LineResult<LineData> {
    validate_page_pair(image, mask)?;
    config.validate()?;

    let angle = estimate_skew_angle(mask, config.max_skew_angle);
    let image = rotate_rgb(image, angle);
    let mask = rotate_gray(mask, angle);

    let lines = build_lines(extract_contours(&mask), config.simplify_contours);
    let lines = order_lines(lines, &mask, config);

    info!(
        lines = lines.len(),
        angle, "line detection finished"
    );

    Ok(LineData {
        image,
        mask,
        rotation_angle: angle,
        lines,
    })
}

/// Runs the full page workflow: text-area deskew first, then line
/// detection restricted to the text area.
///
/// The raw prediction may be any resolution; it is resized to the page
/// during text-area localization. Line candidates outside the text area's
/// bounding rectangle (marginalia, smudges) are dropped before ordering.
///
/// # Returns
///
/// * `Ok(Some(LineData))` - Lines of the deskewed page.
/// * `Ok(None)` - The prediction contains no text area.
/// * `Err(PageLinesError)` - On invalid configuration.
pub fn process_page(
    image: &RgbImage,
    prediction: &GrayImage,
    config: &PipelineConfig,
) -> LineResult<Option<LineData>> {
    config.validate()?;

    let DeskewedPage::Found {
        image,
        prediction,
        contour,
        angle,
    } = deskew_page(image, prediction, config.max_skew_angle)
    else {
        debug!("page has no text area");
        return Ok(None);
    };

    let contours = filter_contours(&prediction, &contour);
    let lines = build_lines(contours, config.simplify_contours);
    let lines = order_lines(lines, &prediction, config);

    info!(lines = lines.len(), angle, "page processing finished");

    Ok(Some(LineData {
        image,
        mask: prediction,
        rotation_angle: angle,
        lines,
    }))
}

/// Clusters lines into rows and resolves the final reading order.
fn order_lines(lines: Vec<Line>, mask: &GrayImage, config: &PipelineConfig) -> Vec<Line> {
    if lines.is_empty() {
        return lines;
    }

    let spacing = estimate_line_spacing(mask, config.slice_width);
    let centers: Vec<LineCenter> = lines.iter().map(LineCenter::of).collect();
    let clusters = cluster_centers(&centers, spacing);

    if config.group_chunks {
        group_line_chunks(&clusters, lines)
    } else {
        // Same ordering pass, no merging: flatten the clusters and pull
        // each line through by id.
        let mut by_id: HashMap<_, _> = lines.into_iter().map(|l| (l.id, l)).collect();
        clusters
            .iter()
            .flatten()
            .filter_map(|center| by_id.remove(&center.id))
            .collect()
    }
}

/// Crops every detected line out of the rotated page image.
///
/// Lines whose masked region turns out empty are skipped with a warning;
/// one degenerate line does not fail the page.
pub fn extract_line_images(data: &LineData, config: &PipelineConfig) -> Vec<RgbImage> {
    data.lines
        .par_iter()
        .filter_map(
            |line| match extract_line(line, &data.image, config.dilation_factor) {
                Ok(crop) => Some(crop),
                Err(err) => {
                    warn!(id = line.id.0, %err, "skipping degenerate line");
                    None
                }
            },
        )
        .collect()
}

/// Produces recognizer-ready input tensors for every detected line.
///
/// Each line crop is normalized onto the configured canvas and converted
/// to a `(1, height, width)` tensor scaled into `[0, 1]`.
pub fn prepare_lines(data: &LineData, config: &PipelineConfig) -> LineResult<Vec<Array3<f32>>> {
    extract_line_images(data, config)
        .par_iter()
        .map(|crop| {
            let padded = pad_ocr_line(
                crop,
                config.target_width,
                config.target_height,
                config.padding,
            )?;
            Ok(prepare_recognizer_input(&padded))
        })
        .collect()
}
