//! High-level roster extraction API.
//!
//! This module provides `RosterExtractorBuilder` for assembling the pipeline
//! (preprocessing, grid detection with contour fallback, zoned cell
//! classification and table assembly) around a [`TextRecognizer`].

use super::classifier::CellClassifier;
use super::fallback::FallbackZoner;
use super::grid_detector::GridDetector;
use super::preprocess::ImagePreprocessor;
use super::table::{Table, TableAssembler};
use crate::core::config::PipelineConfig;
use crate::core::{ConfigValidator, OcrResult, ParallelPolicy, ProcessingStage, TextRecognizer};
use crate::domain::{Cell, CellSet};
use crate::utils::{DebugSink, decode_gray_image, load_gray_image};
use image::GrayImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Which strategy located the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStrategy {
    /// Ruled lines were found; the cell set is rectangular.
    Grid,
    /// Cells were derived from region bounding boxes; rows may be ragged.
    Fallback,
}

/// Result of extracting one roster image.
#[derive(Debug, Clone, Serialize)]
pub struct RosterExtraction {
    /// Source path, or `<memory>` for decoded buffers.
    pub input_path: Arc<str>,
    pub strategy: DetectionStrategy,
    /// Classified cells in detection order.
    pub cells: Vec<Cell>,
    pub table: Table,
}

/// Builder for [`RosterExtractor`].
///
/// # Example
///
/// ```no_run
/// use roster_ocr::pipeline::RosterExtractorBuilder;
/// use roster_ocr::recognition::TesseractCli;
///
/// let extractor = RosterExtractorBuilder::new(TesseractCli::default())
///     .language("ces+eng")
///     .debug_dir("debug")
///     .build()
///     .expect("valid configuration");
/// let extraction = extractor.extract_path("roster.png").expect("extraction");
/// println!("{:?}", extraction.table.columns);
/// ```
pub struct RosterExtractorBuilder {
    recognizer: Arc<dyn TextRecognizer>,
    config: PipelineConfig,
}

impl std::fmt::Debug for RosterExtractorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterExtractorBuilder")
            .field("recognizer", &self.recognizer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl RosterExtractorBuilder {
    /// Creates a builder with default configuration around `recognizer`.
    pub fn new(recognizer: impl TextRecognizer + 'static) -> Self {
        Self::from_shared(Arc::new(recognizer))
    }

    /// Creates a builder around an already shared recognizer.
    pub fn from_shared(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            config: PipelineConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Language tag handed to the recognizer, e.g. `"ces"`.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.classifier.language = language.into();
        self
    }

    pub fn header_row_index(mut self, index: usize) -> Self {
        self.config.classifier.header_row_index = index;
        self
    }

    pub fn name_col_index(mut self, index: usize) -> Self {
        self.config.classifier.name_col_index = index;
        self
    }

    /// Enables debug artifacts under `dir`.
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.debug_dir = Some(dir.into());
        self
    }

    pub fn parallel_policy(mut self, policy: ParallelPolicy) -> Self {
        self.config.parallel = policy;
        self
    }

    /// Validates the configuration and builds the extractor.
    pub fn build(self) -> OcrResult<RosterExtractor> {
        self.config.validate()?;
        let config = self.config;
        Ok(RosterExtractor {
            preprocessor: ImagePreprocessor::new(config.preprocess),
            grid: GridDetector::new(config.grid),
            fallback: FallbackZoner::new(config.fallback),
            assembler: TableAssembler::new(config.classifier.header_row_index),
            classifier: CellClassifier::new(config.classifier).with_parallel_policy(config.parallel),
            debug_sink: DebugSink::new(config.debug_dir),
            recognizer: self.recognizer,
        })
    }
}

/// A configured extraction pipeline. Holds no per-image state; one instance
/// may process any number of images.
pub struct RosterExtractor {
    preprocessor: ImagePreprocessor,
    grid: GridDetector,
    fallback: FallbackZoner,
    classifier: CellClassifier,
    assembler: TableAssembler,
    debug_sink: DebugSink,
    recognizer: Arc<dyn TextRecognizer>,
}

impl std::fmt::Debug for RosterExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterExtractor")
            .field("preprocessor", &self.preprocessor)
            .field("grid", &self.grid)
            .field("fallback", &self.fallback)
            .field("classifier", &self.classifier)
            .field("assembler", &self.assembler)
            .field("debug_sink", &self.debug_sink)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

impl RosterExtractor {
    /// Loads the image at `path` and extracts its table.
    ///
    /// # Errors
    ///
    /// `OCRError::ImageLoad` when the file is missing or undecodable;
    /// `OCRError::Detection` when neither strategy finds any cell.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> OcrResult<RosterExtraction> {
        let path = path.as_ref();
        let gray = load_gray_image(path)?;
        self.run(Arc::from(path.display().to_string()), gray)
    }

    /// Decodes an in-memory image and extracts its table.
    pub fn extract_bytes(&self, bytes: &[u8]) -> OcrResult<RosterExtraction> {
        self.run(Arc::from("<memory>"), decode_gray_image(bytes)?)
    }

    /// Extracts the table of an already decoded grayscale image.
    pub fn extract_image(&self, gray: GrayImage) -> OcrResult<RosterExtraction> {
        self.run(Arc::from("<memory>"), gray)
    }

    #[instrument(skip_all, fields(input = %input_path))]
    fn run(&self, input_path: Arc<str>, gray: GrayImage) -> OcrResult<RosterExtraction> {
        let gray = self.preprocessor.process(gray);
        self.debug_sink.save_stage("00_preprocessed.png", &gray);

        let (cell_set, strategy) = self.locate_cells(&gray)?;
        info!(
            ?strategy,
            cells = cell_set.len(),
            rows = cell_set.row_count(),
            cols = cell_set.col_count(),
            "located cells"
        );

        let cells = self
            .classifier
            .classify(&cell_set, &gray, self.recognizer.as_ref(), &self.debug_sink);
        let table = self.assembler.assemble(&cells);
        info!(rows = table.row_count(), cols = table.column_count(), "table ready");

        Ok(RosterExtraction {
            input_path,
            strategy,
            cells,
            table,
        })
    }

    /// Tries the ruled grid first and falls back to region zoning when it
    /// yields no cells.
    fn locate_cells(&self, gray: &GrayImage) -> OcrResult<(CellSet, DetectionStrategy)> {
        let masks = self.grid.line_masks(gray);
        self.debug_sink.save_stage("01_bw.png", &masks.binary);
        self.debug_sink.save_stage("02_horizontal.png", &masks.horizontal);
        self.debug_sink.save_stage("03_vertical.png", &masks.vertical);

        match self.grid.detect_in_masks(&masks) {
            Ok(cells) if !cells.is_empty() => return Ok((cells, DetectionStrategy::Grid)),
            Ok(_) => info!(
                stage = %ProcessingStage::GridDetection,
                "grid lines bound no cell; falling back to region zoning"
            ),
            Err(no_grid) => info!(
                stage = %ProcessingStage::GridDetection,
                %no_grid,
                "falling back to region zoning"
            ),
        }
        let cells = self.fallback.detect(&masks.binary)?;
        Ok((cells, DetectionStrategy::Fallback))
    }
}
