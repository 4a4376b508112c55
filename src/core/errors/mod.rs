//! Error handling for the roster extraction pipeline.

mod types;

pub use types::{NoGridFound, OCRError, OcrResult, ProcessingStage, RecognitionError};
