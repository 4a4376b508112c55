//! Core error types for the roster extraction pipeline.
//!
//! This module defines the error taxonomy used throughout the system: the main
//! [`OCRError`] enum returned by every fallible public operation, the
//! [`ProcessingStage`] enum that tags which stage failed, the per-cell
//! [`RecognitionError`] produced at the recognition boundary, and the
//! [`NoGridFound`] signal that hands control to the contour fallback.

use std::path::PathBuf;
use thiserror::Error;

/// Enum representing the stages of the extraction pipeline.
///
/// Used to identify where an error occurred so that structural failures can be
/// diagnosed from the error message alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Grayscale conversion, denoising and deskew.
    Preprocessing,
    /// Ruled-line detection and cell construction.
    GridDetection,
    /// Contour-based pseudo-grid construction.
    FallbackZoning,
    /// Per-cell cropping, recognition and normalization.
    CellClassification,
    /// Invocation of the external recognition capability.
    Recognition,
    /// Folding classified cells into a table.
    TableAssembly,
    /// Writing intermediate debug artifacts.
    DebugOutput,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Preprocessing => write!(f, "preprocessing"),
            ProcessingStage::GridDetection => write!(f, "grid detection"),
            ProcessingStage::FallbackZoning => write!(f, "fallback zoning"),
            ProcessingStage::CellClassification => write!(f, "cell classification"),
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::TableAssembly => write!(f, "table assembly"),
            ProcessingStage::DebugOutput => write!(f, "debug output"),
        }
    }
}

/// Enum representing the errors that can abort the extraction pipeline.
#[derive(Error, Debug)]
pub enum OCRError {
    /// The source image is missing or could not be decoded.
    #[error("image load failed for '{path}'", path = path.display())]
    ImageLoad {
        /// Path of the image that failed to load.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Neither ruled lines nor the contour fallback produced any cells.
    #[error("{stage} produced no cells: {reason}")]
    Detection {
        /// The stage that gave up last.
        stage: ProcessingStage,
        /// What was missing.
        reason: String,
    },

    /// A table was requested from an empty cell set.
    #[error("empty input: {context}")]
    EmptyInput {
        /// Where the empty input was encountered.
        context: String,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for pipeline operations.
pub type OcrResult<T> = Result<T, OCRError>;

impl From<crate::core::config::ConfigError> for OCRError {
    /// Converts a ConfigError to OCRError::ConfigError.
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl OCRError {
    /// Creates a detection failure for the given stage.
    pub fn detection(stage: ProcessingStage, reason: impl Into<String>) -> Self {
        Self::Detection {
            stage,
            reason: reason.into(),
        }
    }

    /// Creates an empty-input error.
    pub fn empty_input(context: impl Into<String>) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }

    /// Wraps an error that occurred inside a pipeline stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns the stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::ImageLoad { .. } => Some(ProcessingStage::Preprocessing),
            Self::Detection { stage, .. } => Some(*stage),
            Self::EmptyInput { .. } => Some(ProcessingStage::TableAssembly),
            Self::Processing { kind, .. } => Some(*kind),
            Self::ConfigError { .. } | Self::Io(_) => None,
        }
    }
}

/// Errors raised by a [`TextRecognizer`](crate::core::traits::TextRecognizer).
///
/// These never abort the pipeline: the classifier degrades the affected cell
/// to empty text and continues.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The recognition engine reported a failure.
    #[error("recognition engine failed: {message}")]
    Engine {
        /// Engine-provided description.
        message: String,
    },

    /// The engine produced output that is not valid text.
    #[error("recognition output invalid: {message}")]
    InvalidOutput {
        /// What was wrong with the output.
        message: String,
    },

    /// IO error while handing the region to the engine.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Signal that no ruled grid was found on the page.
///
/// This is not a fatal error: the extractor reacts by running the contour
/// fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no grid found: {horizontal} horizontal and {vertical} vertical line candidates")]
pub struct NoGridFound {
    /// Number of clustered horizontal lines.
    pub horizontal: usize,
    /// Number of clustered vertical lines.
    pub vertical: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_error_names_stage() {
        let err = OCRError::detection(ProcessingStage::FallbackZoning, "no contour boxes");
        assert_eq!(
            err.to_string(),
            "fallback zoning produced no cells: no contour boxes"
        );
        assert_eq!(err.stage(), Some(ProcessingStage::FallbackZoning));
    }

    #[test]
    fn test_image_load_is_attributed_to_preprocessing() {
        let source = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = OCRError::ImageLoad {
            path: PathBuf::from("roster.png"),
            source,
        };
        assert!(err.to_string().contains("roster.png"));
        assert_eq!(err.stage(), Some(ProcessingStage::Preprocessing));
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ProcessingStage::GridDetection.to_string(), "grid detection");
        assert_eq!(
            ProcessingStage::CellClassification.to_string(),
            "cell classification"
        );
        assert_eq!(ProcessingStage::Recognition.to_string(), "recognition");
    }

    #[test]
    fn test_no_grid_found_message() {
        let signal = NoGridFound {
            horizontal: 3,
            vertical: 0,
        };
        assert!(signal.to_string().contains("0 vertical"));
    }
}
