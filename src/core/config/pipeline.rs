//! Configuration for the roster extraction pipeline.
//!
//! Each stage owns a section; [`PipelineConfig`] aggregates them. All sections
//! deserialize with defaults so a configuration file only needs to name the
//! values it changes.

use super::errors::{ConfigError, ConfigValidator};
use super::parallel::ParallelPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for grayscale conversion, denoising and deskew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Median filter radius; 0 disables denoising.
    pub denoise_radius: u32,
    /// Whether to correct page rotation.
    pub deskew: bool,
    /// Lower hysteresis threshold for edge detection.
    pub canny_low: f32,
    /// Upper hysteresis threshold for edge detection.
    pub canny_high: f32,
    /// Minimum accumulator votes for a line to count.
    pub hough_vote_threshold: u32,
    /// Non-maximum suppression radius in the accumulator.
    pub hough_suppression_radius: u32,
    /// Lines whose offset from horizontal exceeds this are ignored.
    pub max_skew_degrees: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise_radius: 1,
            deskew: true,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 200,
            hough_suppression_radius: 8,
            max_skew_degrees: 45.0,
        }
    }
}

impl ConfigValidator for PreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("preprocess.hough_vote_threshold", self.hough_vote_threshold)?;
        self.validate_range("preprocess.max_skew_degrees", self.max_skew_degrees, 0.0, 90.0)?;
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "preprocess.canny_low ({}) must be within [0, canny_high ({})]",
                    self.canny_low, self.canny_high
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for ruled-line detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Adaptive threshold window (odd).
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub threshold_offset: f32,
    /// The base stroke length is `min(width, height) / kernel_divisor`.
    pub kernel_divisor: u32,
    /// Lower bound for the base stroke length.
    pub min_kernel: u32,
    /// Horizontal kernel length as a multiple of the base length.
    pub horizontal_factor: u32,
    /// Vertical kernel length as a multiple of the base length.
    pub vertical_factor: u32,
    /// Opening iterations.
    pub iterations: u32,
    /// Clustering tolerance for row boundaries.
    pub row_tolerance: u32,
    /// Clustering tolerance for column boundaries.
    pub col_tolerance: u32,
    /// Boundary pairs closer than this are not cells.
    pub min_cell_span: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            block_size: 31,
            threshold_offset: 10.0,
            kernel_divisor: 60,
            min_kernel: 8,
            horizontal_factor: 4,
            vertical_factor: 3,
            iterations: 2,
            row_tolerance: 12,
            col_tolerance: 8,
            min_cell_span: 10,
        }
    }
}

impl ConfigValidator for GridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_block_size("grid.block_size", self.block_size)?;
        self.validate_positive("grid.kernel_divisor", self.kernel_divisor)?;
        self.validate_positive("grid.min_kernel", self.min_kernel)?;
        self.validate_positive("grid.horizontal_factor", self.horizontal_factor)?;
        self.validate_positive("grid.vertical_factor", self.vertical_factor)?;
        self.validate_positive("grid.iterations", self.iterations)?;
        self.validate_positive("grid.row_tolerance", self.row_tolerance)?;
        self.validate_positive("grid.col_tolerance", self.col_tolerance)?;
        self.validate_positive("grid.min_cell_span", self.min_cell_span)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for the contour-based fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Boxes with a smaller area are discarded as noise.
    pub min_area: u32,
    /// Maximum top-edge distance from the first box of the current row.
    pub row_tolerance: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_area: 200,
            row_tolerance: 20,
        }
    }
}

impl ConfigValidator for FallbackConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("fallback.row_tolerance", self.row_tolerance)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Settings for zone classification and recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Language tag handed to the recognizer.
    pub language: String,
    /// Row holding the day numbers.
    pub header_row_index: usize,
    /// Column holding the people's names.
    pub name_col_index: usize,
    /// Margin trimmed from every side of a cell before recognition.
    pub inset: u32,
    /// Target size of the longer side for header crops.
    pub header_min_dim: u32,
    /// Target size of the longer side for name crops.
    pub name_min_dim: u32,
    /// Target size of the longer side for body crops.
    pub body_min_dim: u32,
    /// Window of the page-wide threshold used for header and body crops.
    pub ocr_block_size: u32,
    /// Offset of the page-wide threshold.
    pub ocr_threshold_offset: f32,
    /// Window of the finer threshold applied to name crops.
    pub name_block_size: u32,
    /// Offset of the name threshold.
    pub name_threshold_offset: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            header_row_index: 0,
            name_col_index: 0,
            inset: 2,
            header_min_dim: 60,
            name_min_dim: 120,
            body_min_dim: 50,
            ocr_block_size: 31,
            ocr_threshold_offset: 2.0,
            name_block_size: 29,
            name_threshold_offset: 5.0,
        }
    }
}

impl ConfigValidator for ClassifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "classifier.language must not be empty".to_string(),
            });
        }
        self.validate_block_size("classifier.ocr_block_size", self.ocr_block_size)?;
        self.validate_block_size("classifier.name_block_size", self.name_block_size)?;
        self.validate_positive("classifier.header_min_dim", self.header_min_dim)?;
        self.validate_positive("classifier.name_min_dim", self.name_min_dim)?;
        self.validate_positive("classifier.body_min_dim", self.body_min_dim)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub grid: GridConfig,
    pub fallback: FallbackConfig,
    pub classifier: ClassifierConfig,
    pub parallel: ParallelPolicy,
    /// Directory for intermediate images; `None` disables debug output.
    pub debug_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.display().to_string(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| load_failed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.preprocess.validate()?;
        self.grid.validate()?;
        self.fallback.validate()?;
        self.classifier.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_even_block_size_is_rejected() {
        let config = GridConfig {
            block_size: 30,
            ..GridConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grid.block_size"));
    }

    #[test]
    fn test_skew_limit_must_be_positive() {
        let config = PreprocessConfig {
            max_skew_degrees: 0.0,
            ..PreprocessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"classifier": {{"language": "ces", "name_col_index": 1}}, "grid": {{"row_tolerance": 6}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.classifier.language, "ces");
        assert_eq!(config.classifier.name_col_index, 1);
        assert_eq!(config.classifier.header_row_index, 0);
        assert_eq!(config.grid.row_tolerance, 6);
        assert_eq!(config.grid.col_tolerance, 8);
        assert_eq!(config.debug_dir, None);
    }

    #[test]
    fn test_invalid_json_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = PipelineConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
