//! Core building blocks of the line segmentation pipeline.
//!
//! This module contains the fundamental pieces shared across all processing
//! stages:
//! - Error handling
//! - Input validation
//!
//! It also re-exports the commonly used types for convenience.

pub mod errors;
pub mod validation;

pub use errors::{LineResult, PageLinesError, ProcessingStage};
pub use validation::{validate_canvas_size, validate_page_pair};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the subscriber with an environment filter and a formatting
/// layer; typically called once at application start.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
