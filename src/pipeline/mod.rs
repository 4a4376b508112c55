//! The roster extraction pipeline.
//!
//! Stages run strictly forward:
//!
//! ```text
//! ImagePreprocessor → GridDetector | FallbackZoner → CellClassifier → TableAssembler
//! ```
//!
//! [`RosterExtractor`] wires them together; each stage is also usable on its
//! own.

pub mod classifier;
pub mod extractor;
pub mod fallback;
pub mod grid_detector;
pub mod preprocess;
pub mod table;

pub use classifier::CellClassifier;
pub use extractor::{DetectionStrategy, RosterExtraction, RosterExtractor, RosterExtractorBuilder};
pub use fallback::FallbackZoner;
pub use grid_detector::{GridDetector, GridMasks, cells_from_lines};
pub use preprocess::{ImagePreprocessor, rotate_about_center_replicate};
pub use table::{Table, TableAssembler};
