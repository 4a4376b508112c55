//! # Roster OCR
//!
//! A Rust library that extracts a people × day-of-month table from a
//! photographed or scanned roster sheet.
//!
//! ## Features
//!
//! - Automatic deskew of tilted captures
//! - Ruled-grid detection with directional morphology, with a contour-based
//!   fallback for sheets without visible lines
//! - Zone-aware normalization of header days, names and shift codes
//! - Pluggable character recognition behind the [`TextRecognizer`](core::TextRecognizer) trait
//! - Optional parallel cell recognition on the rayon pool
//!
//! ## Modules
//!
//! * [`core`] - Error taxonomy, configuration and the recognition trait
//! * [`domain`] - Cells, zones, vocabularies and normalization
//! * [`pipeline`] - The extraction stages and [`RosterExtractor`](pipeline::RosterExtractor)
//! * [`processors`] - Thresholding, morphology, clustering and geometry
//! * [`recognition`] - The `tesseract` command-line recognizer
//! * [`utils`] - Image helpers, debug artifacts and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roster_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = RosterExtractorBuilder::new(TesseractCli::default())
//!     .language("ces")
//!     .build()?;
//!
//! let extraction = extractor.extract_path("roster.jpg")?;
//! let mut csv = Vec::new();
//! extraction.table.write_csv(&mut csv)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod recognition;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use roster_ocr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{
        OCRError, OcrResult, PipelineConfig, RecognitionError, RecognitionRequest,
        SegmentationMode, TextRecognizer,
    };
    pub use crate::domain::{Cell, ZoneKind};
    pub use crate::pipeline::{
        DetectionStrategy, RosterExtraction, RosterExtractor, RosterExtractorBuilder, Table,
    };
    pub use crate::recognition::TesseractCli;
    pub use crate::utils::load_gray_image;
}
