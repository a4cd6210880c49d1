//! Processing stages of the line segmentation pipeline.
//!
//! Each submodule implements one stage: geometric primitives, text-area
//! localization, skew correction, contour extraction, spacing estimation,
//! reading-order clustering, line cropping, and recognizer-input
//! normalization. The [`pipeline`](crate::pipeline) module wires them
//! together.

pub mod contours;
pub mod extraction;
pub mod geometry;
pub mod normalization;
pub mod ordering;
pub mod skew;
pub mod spacing;
pub mod text_area;

pub use contours::{build_lines, extract_contours, Line, LineId, MIN_LINE_HEIGHT};
pub use extraction::{extract_line, mask_and_crop, DEFAULT_DILATION_FACTOR};
pub use geometry::{BoundingBox, Contour, MinAreaRect, Point};
pub use normalization::{
    binarize, pad_ocr_line, prepare_recognizer_input, PaddingFill, DEFAULT_TARGET_HEIGHT,
    DEFAULT_TARGET_WIDTH,
};
pub use ordering::{cluster_centers, group_line_chunks, LineCenter};
pub use skew::{estimate_skew_angle, rotate_gray, rotate_rgb, DEFAULT_MAX_SKEW_ANGLE};
pub use spacing::{estimate_line_spacing, DEFAULT_SLICE_WIDTH};
pub use text_area::{deskew_page, filter_contours, get_text_area, DeskewedPage, TextArea};
