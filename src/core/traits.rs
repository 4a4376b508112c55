//! The recognition capability boundary.
//!
//! Character recognition is an external collaborator. The pipeline only needs
//! a function that turns a grayscale region plus constraints into a candidate
//! string; [`TextRecognizer`] is that function as a trait so tests can inject
//! a deterministic stub and production code can plug in a real engine.

use crate::core::errors::RecognitionError;
use image::GrayImage;

/// Page segmentation hint passed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Treat the region as a single uniform block of text.
    SingleBlock,
    /// Treat the region as a single text line.
    SingleLine,
}

impl SegmentationMode {
    /// Tesseract page segmentation mode number.
    pub fn psm(self) -> u8 {
        match self {
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::SingleLine => 7,
        }
    }
}

/// Parameters of a single recognition call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionRequest<'a> {
    /// Language tag, e.g. `"ces"` or `"ces+eng"`.
    pub language: &'a str,
    /// Characters the engine may emit; `None` leaves it unconstrained.
    pub whitelist: Option<&'a str>,
    pub segmentation: SegmentationMode,
    /// Engine-specific `key=value` options.
    pub options: &'a [(&'a str, &'a str)],
}

impl<'a> RecognitionRequest<'a> {
    pub fn new(language: &'a str, segmentation: SegmentationMode) -> Self {
        Self {
            language,
            whitelist: None,
            segmentation,
            options: &[],
        }
    }

    pub fn with_whitelist(mut self, whitelist: &'a str) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn with_options(mut self, options: &'a [(&'a str, &'a str)]) -> Self {
        self.options = options;
        self
    }
}

/// A character recognition capability.
///
/// Implementations must be safe to call from several threads at once when
/// parallel cell recognition is enabled.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes the text in `region`.
    fn recognize(
        &self,
        region: &GrayImage,
        request: &RecognitionRequest<'_>,
    ) -> Result<String, RecognitionError>;

    /// Name used in log messages.
    fn name(&self) -> &str {
        "recognizer"
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for std::sync::Arc<T> {
    fn recognize(
        &self,
        region: &GrayImage,
        request: &RecognitionRequest<'_>,
    ) -> Result<String, RecognitionError> {
        (**self).recognize(region, request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
