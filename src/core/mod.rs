//! The core module of the extraction pipeline.
//!
//! This module contains the pieces every stage depends on:
//! - Configuration management
//! - Error handling
//! - The recognition capability boundary

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, ParallelPolicy, PipelineConfig};
pub use errors::{NoGridFound, OCRError, OcrResult, ProcessingStage, RecognitionError};
pub use traits::{RecognitionRequest, SegmentationMode, TextRecognizer};
