//! Connected-region extraction and line candidate construction.
//!
//! The segmentation mask arrives as a flat binary buffer; this module
//! traces its connected foreground regions into [`Contour`]s, compresses
//! the traced outlines down to their direction-change vertices, and builds
//! the [`Line`] candidates the rest of the pipeline works with.

use crate::processors::geometry::{BoundingBox, Contour, Point};
use image::GrayImage;
use imageproc::contours::find_contours;

/// Lines whose bounding box height does not exceed this many pixels are
/// treated as speckle noise, not text. Fixed by design, not configurable.
pub const MIN_LINE_HEIGHT: i32 = 10;

/// Default perimeter fraction used when simplifying a contour during line
/// construction.
pub const DEFAULT_SIMPLIFY_EPSILON_RATIO: f32 = 0.001;

/// Stable opaque identifier assigned to each [`Line`] at creation.
///
/// Clustering and group merging key on these ids; centers are geometry,
/// not identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u32);

/// One physical text line candidate, possibly merged from several mask
/// components.
///
/// A line owns exactly one contour and derives exactly one bounding box
/// from it. Lines are transient: they exist within a single pipeline
/// invocation and are consumed by the line extractor.
#[derive(Debug, Clone)]
pub struct Line {
    /// Stable id assigned at creation.
    pub id: LineId,
    /// Closed polygon outlining the line region.
    pub contour: Contour,
    /// Axis-aligned bounding box derived from the contour.
    pub bbox: BoundingBox,
    /// Integer center of the bounding box.
    pub center: (i32, i32),
}

impl Line {
    /// Builds a line from a contour, simplifying the outline first.
    ///
    /// # Arguments
    ///
    /// * `id` - Stable id for the new line.
    /// * `contour` - The traced region outline.
    /// * `simplify` - Whether to apply Douglas-Peucker simplification with
    ///   [`DEFAULT_SIMPLIFY_EPSILON_RATIO`] before deriving geometry.
    pub fn from_contour(id: LineId, contour: Contour, simplify: bool) -> Self {
        let contour = if simplify {
            contour.simplify(DEFAULT_SIMPLIFY_EPSILON_RATIO)
        } else {
            contour
        };

        let bbox = contour.bounding_rect();
        let center = bbox.center();

        Self {
            id,
            contour,
            bbox,
            center,
        }
    }
}

/// Extracts the connected foreground regions of a mask as a flat contour
/// list (outer and hole borders alike, no hierarchy).
///
/// Traced outlines are compressed to their direction-change vertices, so
/// runs of collinear border pixels collapse to their endpoints.
///
/// The list is emitted in bottom-to-top scan order. Downstream clustering
/// unconditionally reverses its group list and was tuned against a tracer
/// with this emission order; `imageproc` traces top-to-bottom, so the
/// result is reversed here to keep that coupling intact.
///
/// # Arguments
///
/// * `mask` - Binary mask; any non-zero pixel is foreground.
///
/// # Returns
///
/// The contours of every connected region, or an empty vector for a mask
/// with no foreground pixels.
pub fn extract_contours(mask: &GrayImage) -> Vec<Contour> {
    let mut contours: Vec<Contour> = find_contours::<i32>(mask)
        .into_iter()
        .map(|c| {
            let points = c.points.into_iter().map(Point::from_imageproc_point).collect();
            compress_direction_changes(Contour::new(points))
        })
        .collect();

    contours.reverse();
    contours
}

/// Builds line candidates from extracted contours, dropping speckle.
///
/// Each surviving contour becomes one [`Line`] with a sequential id.
/// Candidates whose bounding box height is at most [`MIN_LINE_HEIGHT`]
/// pixels are discarded.
///
/// # Arguments
///
/// * `contours` - Contours in extraction order.
/// * `simplify` - Whether to simplify each contour (see [`Line::from_contour`]).
pub fn build_lines(contours: Vec<Contour>, simplify: bool) -> Vec<Line> {
    contours
        .into_iter()
        .enumerate()
        .map(|(idx, contour)| Line::from_contour(LineId(idx as u32), contour, simplify))
        .filter(|line| line.bbox.height > MIN_LINE_HEIGHT)
        .collect()
}

/// Drops vertices where the outline continues in the same direction.
///
/// Border tracing emits every boundary pixel; only the vertices where the
/// step direction changes carry shape information.
fn compress_direction_changes(contour: Contour) -> Contour {
    let points = &contour.points;
    if points.len() <= 2 {
        return contour;
    }

    let n = points.len();
    let mut kept = Vec::with_capacity(n / 2);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];

        let incoming = (curr.x - prev.x, curr.y - prev.y);
        let outgoing = (next.x - curr.x, next.y - curr.y);

        if incoming != outgoing {
            kept.push(curr);
        }
    }

    if kept.is_empty() {
        // Fully collinear outline, keep the endpoints.
        kept.push(points[0]);
        kept.push(points[n - 1]);
    }

    Contour::new(kept)
}
