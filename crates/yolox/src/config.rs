use crate::error::{Result, YoloxError};
use std::env;

pub use common::Environment;

/// Downsampling factors of the three YOLOX detection heads.
pub const DEFAULT_STRIDES: [u32; 3] = [8, 16, 32];

/// center-x offset, center-y offset, log-width, log-height, objectness
pub const NUM_BBOX_FIELDS: usize = 5;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);
pub const DEFAULT_NUM_CLASSES: usize = 80;
pub const DEFAULT_MAX_DETECTIONS: usize = 100;

/// Model-architecture parameters the decoder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub strides: Vec<u32>,
    pub num_classes: usize,
    pub num_bbox_fields: usize,
    pub confidence_threshold: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strides: DEFAULT_STRIDES.to_vec(),
            num_classes: DEFAULT_NUM_CLASSES,
            num_bbox_fields: NUM_BBOX_FIELDS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl DecoderConfig {
    pub fn new(strides: Vec<u32>, num_classes: usize, confidence_threshold: f32) -> Result<Self> {
        let config = Self {
            strides,
            num_classes,
            num_bbox_fields: NUM_BBOX_FIELDS,
            confidence_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.strides.is_empty() {
            return Err(YoloxError::Configuration("stride set is empty".to_string()));
        }
        if self.strides.contains(&0) {
            return Err(YoloxError::Configuration(format!(
                "strides must be positive, got {:?}",
                self.strides
            )));
        }
        validate_bbox_fields(self.num_bbox_fields)?;
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(YoloxError::Configuration(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }

    /// Values per anchor in the flat output tensor.
    pub fn proposal_length(&self) -> usize {
        self.num_classes.saturating_add(self.num_bbox_fields)
    }
}

pub(crate) fn validate_bbox_fields(num_bbox_fields: usize) -> Result<()> {
    if num_bbox_fields != NUM_BBOX_FIELDS {
        return Err(YoloxError::Configuration(format!(
            "expected {} bbox fields per anchor, got {}",
            NUM_BBOX_FIELDS, num_bbox_fields
        )));
    }
    Ok(())
}

/// Parse a comma-separated stride list such as `8,16,32`.
pub fn parse_strides(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|e| {
                YoloxError::Configuration(format!("invalid stride '{}': {}", s, e))
            })
        })
        .collect()
}

/// Settings for the `yolox-decode` binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub tensor_path: String,
    pub colormap_path: String,
    pub input_size: (u32, u32),
    pub max_detections: usize,
    pub decoder: DecoderConfig,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_env();

        let tensor_path = env::var("TENSOR_PATH").unwrap_or_else(|_| "output.bin".to_string());

        let colormap_path =
            env::var("COLORMAP_PATH").unwrap_or_else(|_| "colormap.json".to_string());

        let input_width = env::var("INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.0);

        let input_height = env::var("INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.1);

        let strides = match env::var("YOLOX_STRIDES") {
            Ok(value) => parse_strides(&value)?,
            Err(_) => DEFAULT_STRIDES.to_vec(),
        };

        let num_classes = env::var("NUM_CLASSES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_NUM_CLASSES);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        let max_detections = env::var("MAX_DETECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_DETECTIONS);

        Ok(Self {
            environment,
            tensor_path,
            colormap_path,
            input_size: (input_width, input_height),
            max_detections,
            decoder: DecoderConfig::new(strides, num_classes, confidence_threshold)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "TENSOR_PATH",
        "COLORMAP_PATH",
        "INPUT_WIDTH",
        "INPUT_HEIGHT",
        "YOLOX_STRIDES",
        "NUM_CLASSES",
        "CONFIDENCE_THRESHOLD",
        "MAX_DETECTIONS",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = DecoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.proposal_length(), 85);
    }

    #[test]
    fn empty_strides_rejected() {
        let err = DecoderConfig::new(vec![], 80, 0.5).unwrap_err();
        assert!(matches!(err, YoloxError::Configuration(_)));
    }

    #[test]
    fn zero_stride_rejected() {
        let err = DecoderConfig::new(vec![8, 0], 80, 0.5).unwrap_err();
        assert!(matches!(err, YoloxError::Configuration(_)));
    }

    #[test]
    fn mismatched_bbox_fields_rejected() {
        let config = DecoderConfig {
            num_bbox_fields: 4,
            ..DecoderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(YoloxError::Configuration(_))
        ));
    }

    #[test]
    fn threshold_outside_unit_interval_rejected() {
        assert!(DecoderConfig::new(vec![8], 1, 1.5).is_err());
        assert!(DecoderConfig::new(vec![8], 1, -0.1).is_err());
        assert!(DecoderConfig::new(vec![8], 1, f32::NAN).is_err());
        assert!(DecoderConfig::new(vec![8], 1, 0.0).is_ok());
        assert!(DecoderConfig::new(vec![8], 1, 1.0).is_ok());
    }

    #[test]
    fn parse_strides_accepts_whitespace() {
        assert_eq!(parse_strides("8, 16 ,32").unwrap(), vec![8, 16, 32]);
        assert!(parse_strides("8,x").is_err());
        assert!(parse_strides("").unwrap().is_empty());
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.input_size, DEFAULT_INPUT_SIZE);
        assert_eq!(config.decoder, DecoderConfig::default());
        assert_eq!(config.max_detections, DEFAULT_MAX_DETECTIONS);
        assert_eq!(config.tensor_path, "output.bin");
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            env::set_var("YOLOX_STRIDES", "16,32");
            env::set_var("NUM_CLASSES", "2");
            env::set_var("CONFIDENCE_THRESHOLD", "0.25");
            env::set_var("INPUT_WIDTH", "not-a-number");
        }
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.decoder.strides, vec![16, 32]);
        assert_eq!(config.decoder.num_classes, 2);
        assert_eq!(config.decoder.confidence_threshold, 0.25);
        assert_eq!(config.input_size.0, DEFAULT_INPUT_SIZE.0);
        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_bad_strides() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe { env::set_var("YOLOX_STRIDES", "8,,abc") };
        assert!(matches!(
            AppConfig::from_env(),
            Err(YoloxError::Configuration(_))
        ));
        clear_env();
    }
}
