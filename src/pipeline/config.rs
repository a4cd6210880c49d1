//! Pipeline configuration.

use crate::core::errors::{LineResult, PageLinesError};
use crate::processors::extraction::DEFAULT_DILATION_FACTOR;
use crate::processors::normalization::{
    PaddingFill, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH,
};
use crate::processors::skew::DEFAULT_MAX_SKEW_ANGLE;
use crate::processors::spacing::DEFAULT_SLICE_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters of the line detection pipeline.
///
/// Every field has a default, so a partial JSON document configures only
/// what it names. Structural constants (the speckle height floor, the noise
/// area ratio) are deliberately not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum plausible skew magnitude in degrees.
    #[serde(default = "default_max_skew_angle")]
    pub max_skew_angle: f32,
    /// Width of the vertical slices sampled by the spacing estimator.
    #[serde(default = "default_slice_width")]
    pub slice_width: u32,
    /// Whether same-row line chunks are merged into one line.
    #[serde(default = "default_true")]
    pub group_chunks: bool,
    /// Whether line contours are simplified before geometry derivation.
    #[serde(default = "default_true")]
    pub simplify_contours: bool,
    /// Mask widening relative to a line's bbox height during extraction.
    #[serde(default = "default_dilation_factor")]
    pub dilation_factor: f32,
    /// Recognizer canvas width.
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    /// Recognizer canvas height.
    #[serde(default = "default_target_height")]
    pub target_height: u32,
    /// Fill color used when padding onto the recognizer canvas.
    #[serde(default)]
    pub padding: PaddingFill,
}

fn default_max_skew_angle() -> f32 {
    DEFAULT_MAX_SKEW_ANGLE
}

fn default_slice_width() -> u32 {
    DEFAULT_SLICE_WIDTH
}

fn default_true() -> bool {
    true
}

fn default_dilation_factor() -> f32 {
    DEFAULT_DILATION_FACTOR
}

fn default_target_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}

fn default_target_height() -> u32 {
    DEFAULT_TARGET_HEIGHT
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_skew_angle: default_max_skew_angle(),
            slice_width: default_slice_width(),
            group_chunks: true,
            simplify_contours: true,
            dilation_factor: default_dilation_factor(),
            target_width: default_target_width(),
            target_height: default_target_height(),
            padding: PaddingFill::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> LineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> LineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks the parameter ranges that the pipeline cannot tolerate.
    pub fn validate(&self) -> LineResult<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(PageLinesError::config_error(
                "target canvas dimensions must be non-zero",
            ));
        }
        if self.slice_width == 0 {
            return Err(PageLinesError::config_error("slice_width must be non-zero"));
        }
        if !(0.0..=90.0).contains(&self.max_skew_angle) {
            return Err(PageLinesError::config_error(format!(
                "max_skew_angle {} outside [0, 90]",
                self.max_skew_angle
            )));
        }
        if self.dilation_factor < 0.0 {
            return Err(PageLinesError::config_error(format!(
                "dilation_factor {} must not be negative",
                self.dilation_factor
            )));
        }
        Ok(())
    }
}
