//! Runtime configuration for the recognition pipeline.
//!
//! All tunables default to the values the bundled models were exported and
//! tuned with; see [`crate::core::constants`]. Overriding them is supported
//! for experiments but the numeric contract with the models stays with the
//! deployment that does so.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    CLASSIFICATION_INPUT_SIZE, CONFIDENCE_THRESHOLD, CROP_PADDING_RATIO, DETECTION_INPUT_SIZE,
    MAX_RANKED_RESULTS,
};
use crate::core::errors::{RecognitionError, RecognitionResult};

/// Tunables for the recognition pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecognizerConfig {
    /// Square input side length for the detector.
    pub detection_size: u32,
    /// Square input side length for both classifiers.
    pub classification_size: u32,
    /// Minimum class score a detection candidate must strictly exceed.
    pub confidence_threshold: f32,
    /// Fraction of each crop dimension added as padding on every side.
    pub crop_padding: f32,
    /// Maximum number of entries kept in a fused ranked list.
    pub max_results: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            detection_size: DETECTION_INPUT_SIZE,
            classification_size: CLASSIFICATION_INPUT_SIZE,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            crop_padding: CROP_PADDING_RATIO,
            max_results: MAX_RANKED_RESULTS,
        }
    }
}

impl RecognizerConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RecognitionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            RecognitionError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every tunable is in its documented range.
    pub fn validate(&self) -> RecognitionResult<()> {
        if self.detection_size == 0 {
            return Err(RecognitionError::config("detection_size must be > 0"));
        }
        if self.classification_size == 0 {
            return Err(RecognitionError::config("classification_size must be > 0"));
        }
        if !self.confidence_threshold.is_finite()
            || self.confidence_threshold <= 0.0
            || self.confidence_threshold >= 1.0
        {
            return Err(RecognitionError::config(format!(
                "confidence_threshold must be in (0, 1), got {}",
                self.confidence_threshold
            )));
        }
        if !self.crop_padding.is_finite() || self.crop_padding < 0.0 || self.crop_padding >= 1.0 {
            return Err(RecognitionError::config(format!(
                "crop_padding must be in [0, 1), got {}",
                self.crop_padding
            )));
        }
        if self.max_results == 0 {
            return Err(RecognitionError::config("max_results must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RecognizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection_size, 640);
        assert_eq!(config.classification_size, 224);
        assert_eq!(config.max_results, 5);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = RecognizerConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RecognitionError::Config { .. })
        ));

        let config = RecognizerConfig {
            detection_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: RecognizerConfig =
            serde_json::from_str(r#"{ "confidence_threshold": 0.25 }"#).unwrap();
        assert_eq!(config.confidence_threshold, 0.25);
        assert_eq!(config.detection_size, 640);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<RecognizerConfig, _> =
            serde_json::from_str(r#"{ "confidence_treshold": 0.25 }"#);
        assert!(parsed.is_err());
    }
}
