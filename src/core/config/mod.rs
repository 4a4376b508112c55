//! Configuration management for the extraction pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for loading pipeline configurations.

pub mod errors;
pub mod parallel;
pub mod pipeline;

pub use errors::{ConfigError, ConfigValidator};
pub use parallel::ParallelPolicy;
pub use pipeline::{ClassifierConfig, FallbackConfig, GridConfig, PipelineConfig, PreprocessConfig};
