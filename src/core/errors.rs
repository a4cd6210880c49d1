//! Error types for the line segmentation pipeline.
//!
//! This module defines the error types that can occur while post-processing
//! a segmentation mask, along with utility constructors for creating errors
//! with appropriate context.

use thiserror::Error;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage of the pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while estimating or applying skew correction.
    SkewCorrection,
    /// Error occurred during contour extraction or filtering.
    ContourExtraction,
    /// Error occurred during reading-order clustering.
    Ordering,
    /// Error occurred while extracting a line crop.
    LineExtraction,
    /// Error occurred during canvas normalization.
    Normalization,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::SkewCorrection => write!(f, "skew correction"),
            ProcessingStage::ContourExtraction => write!(f, "contour extraction"),
            ProcessingStage::Ordering => write!(f, "ordering"),
            ProcessingStage::LineExtraction => write!(f, "line extraction"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the pipeline.
#[derive(Error, Debug)]
pub enum PageLinesError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error while parsing a JSON configuration document.
    #[error("configuration parse")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Implementation of PageLinesError with utility functions for creating errors.
impl PageLinesError {
    /// Creates a PageLinesError for a failed processing stage.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    ///
    /// # Returns
    ///
    /// A PageLinesError instance.
    pub fn processing(stage: ProcessingStage, context: impl Into<String>) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
        }
    }

    /// Creates a PageLinesError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    ///
    /// # Returns
    ///
    /// A PageLinesError instance.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a PageLinesError for a configuration problem.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    ///
    /// # Returns
    ///
    /// A PageLinesError instance.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Convenient result alias for pipeline operations.
pub type LineResult<T> = Result<T, PageLinesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_display() {
        let err = PageLinesError::processing(ProcessingStage::LineExtraction, "empty mask");
        assert_eq!(err.to_string(), "line extraction failed: empty mask");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = PageLinesError::invalid_input("mask is 10x10 but image is 20x20");
        assert!(err.to_string().contains("invalid input"));
    }
}
