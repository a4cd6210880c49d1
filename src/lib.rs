//! # pagelines
//!
//! Post-processing for text-line segmentation of scanned document pages.
//! Takes a page image and the raw line mask produced by a segmentation
//! model, and turns them into deskewed, ordered, recognizer-ready line
//! images.
//!
//! ## Components
//!
//! - **Text-area localization**: Reduce a page to its dominant text region
//! - **Skew correction**: Level the page from the mask's line orientations
//! - **Line detection**: Trace, filter, and order the mask's line regions
//! - **Line extraction**: Crop each line with a safety dilation margin
//! - **Normalization**: Fit crops onto the fixed recognizer canvas
//!
//! ## Modules
//!
//! * [`core`] - Error types and input validation
//! * [`pipeline`] - End-to-end orchestration and configuration
//! * [`processors`] - The individual processing stages
//! * [`utils`] - Image I/O and preview rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagelines::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = load_image(Path::new("page.jpg"))?;
//! let mask = load_mask(Path::new("page_mask.png"))?;
//!
//! let config = PipelineConfig::default();
//! let data = detect_lines(&image, &mask, &config)?;
//!
//! for line in &data.lines {
//!     println!("line {:?} at y={}", line.id, line.bbox.y);
//! }
//!
//! let tensors = prepare_lines(&data, &config)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{LineResult, PageLinesError};
    pub use crate::pipeline::{
        detect_lines, extract_line_images, prepare_lines, process_page, LineData, PipelineConfig,
    };
    pub use crate::processors::{
        BoundingBox, Contour, Line, LineId, PaddingFill, Point,
    };
    pub use crate::utils::{load_image, load_mask};
}
