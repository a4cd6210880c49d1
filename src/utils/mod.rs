//! Shared utilities: image I/O and preview rendering.

pub mod image;
pub mod visualization;

pub use image::{dynamic_to_gray, dynamic_to_rgb, load_image, load_images_batch, load_mask};
pub use visualization::{
    create_line_preview, create_page_preview, PageClass, PreviewPalette, DEFAULT_PREVIEW_ALPHA,
};
