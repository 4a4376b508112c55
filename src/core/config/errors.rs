//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a configuration file could not be read or parsed.
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: String, message: String },
}

/// A trait for validating configuration parameters.
///
/// Every configuration section of the pipeline implements this so that a
/// malformed file is rejected before any image is touched.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates an adaptive-threshold block size (odd, at least 3).
    fn validate_block_size(&self, field: &str, block_size: u32) -> Result<(), ConfigError> {
        if block_size < 3 || block_size % 2 == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be an odd number >= 3, got {block_size}"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that an integer parameter is strictly positive.
    fn validate_positive(&self, field: &str, value: u32) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be greater than 0"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a float parameter lies within `(min, max]`.
    fn validate_range(&self, field: &str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
        if !value.is_finite() || value <= min || value > max {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be in ({min}, {max}], got {value}"),
            })
        } else {
            Ok(())
        }
    }
}
