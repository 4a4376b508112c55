//! Concrete [`TextRecognizer`](crate::core::TextRecognizer) implementations.

pub mod tesseract;

pub use tesseract::TesseractCli;
