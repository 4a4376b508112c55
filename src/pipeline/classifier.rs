//! # Stage Definition: Cell Classification
//!
//! - **Inputs**: a [`CellSet`], the preprocessed grayscale page and a
//!   [`TextRecognizer`].
//! - **Outputs**: one [`Cell`] per input cell, in input order, with its zone
//!   assigned and its text normalized.
//! - **Error Behavior**: never fails. A recognition error is logged and the
//!   cell's text becomes empty; an empty crop yields empty text.
//! - **Parallelism**: cells are classified on the rayon pool when the
//!   [`ParallelPolicy`] asks for it; output order is unaffected.

use crate::core::config::ClassifierConfig;
use crate::core::{ParallelPolicy, ProcessingStage, RecognitionRequest, SegmentationMode, TextRecognizer};
use crate::domain::vocabulary::{BODY_WHITELIST, DIGIT_WHITELIST, NAME_RECOGNITION_OPTIONS, NAME_WHITELIST};
use crate::domain::{Cell, CellSet, GridCell, ZoneKind, clean_recognized};
use crate::processors::{
    Axis, Polarity, adaptive_threshold_gaussian, invert, mean_intensity, open_line, subtract,
};
use crate::utils::{DebugSink, crop_gray, soften, upscale_to};
use image::GrayImage;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

/// Fraction of the crop height used as the vertical-rule kernel in name cells.
const NAME_RULE_KERNEL_DIVISOR: u32 = 8;
const NAME_RULE_KERNEL_MIN: u32 = 3;

/// Assigns zones and reads every cell through a [`TextRecognizer`].
#[derive(Debug, Clone, Default)]
pub struct CellClassifier {
    config: ClassifierConfig,
    parallel: ParallelPolicy,
}

/// The two page-wide rasters every cell crop is cut from.
struct PageViews<'a> {
    gray: &'a GrayImage,
    binary: GrayImage,
}

impl CellClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            parallel: ParallelPolicy::default(),
        }
    }

    pub fn with_parallel_policy(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Zone of the cell at `(row, col)` under the configured indices.
    pub fn zone_of(&self, row: usize, col: usize) -> ZoneKind {
        ZoneKind::of(
            row,
            col,
            self.config.header_row_index,
            self.config.name_col_index,
        )
    }

    /// Classifies every cell of `cells` against `gray`.
    #[instrument(skip_all, name = "cell_classification", fields(cells = cells.len()))]
    pub fn classify(
        &self,
        cells: &CellSet,
        gray: &GrayImage,
        recognizer: &dyn TextRecognizer,
        debug_sink: &DebugSink,
    ) -> Vec<Cell> {
        let page = PageViews {
            gray,
            binary: adaptive_threshold_gaussian(
                gray,
                self.config.ocr_block_size,
                self.config.ocr_threshold_offset,
                Polarity::Binary,
            ),
        };

        let classify_one = |cell: &GridCell| self.classify_cell(*cell, &page, recognizer, debug_sink);
        if self.parallel.should_parallelize(cells.len()) {
            debug!("classifying cells in parallel");
            cells.cells().par_iter().map(classify_one).collect()
        } else {
            cells.cells().iter().map(classify_one).collect()
        }
    }

    fn classify_cell(
        &self,
        cell: GridCell,
        page: &PageViews<'_>,
        recognizer: &dyn TextRecognizer,
        debug_sink: &DebugSink,
    ) -> Cell {
        let zone = self.zone_of(cell.row, cell.col);
        let Some(region) = cell
            .bbox
            .inset(self.config.inset, page.gray.width(), page.gray.height())
        else {
            debug!(
                stage = %ProcessingStage::CellClassification,
                row = cell.row,
                col = cell.col,
                "cell vanishes after inset; leaving it empty"
            );
            return Cell::new(cell, zone, String::new());
        };

        let (text, fed) = match zone {
            ZoneKind::Header => {
                let roi = upscale_to(&crop_gray(&page.binary, &region), self.config.header_min_dim);
                let request = RecognitionRequest::new(&self.config.language, SegmentationMode::SingleLine)
                    .with_whitelist(DIGIT_WHITELIST);
                let raw = self.recognize(recognizer, &roi, &request, cell);
                (zone.normalize(&raw), roi)
            }
            ZoneKind::Name => self.read_name(&crop_gray(page.gray, &region), recognizer, cell),
            ZoneKind::Body => {
                let roi = upscale_to(&crop_gray(&page.binary, &region), self.config.body_min_dim);
                let request = RecognitionRequest::new(&self.config.language, SegmentationMode::SingleBlock)
                    .with_whitelist(BODY_WHITELIST);
                let raw = self.recognize(recognizer, &roi, &request, cell);
                (zone.normalize(&raw), roi)
            }
        };

        debug_sink.save_cell(cell.row, cell.col, &fed);
        Cell::new(cell, zone, text)
    }

    /// Reads a name cell. Returns the normalized text and the image whose
    /// reading was considered last.
    fn read_name(
        &self,
        raw_crop: &GrayImage,
        recognizer: &dyn TextRecognizer,
        cell: GridCell,
    ) -> (String, GrayImage) {
        let prepared = upscale_to(&self.strip_vertical_rules(raw_crop), self.config.name_min_dim);
        let request = RecognitionRequest::new(&self.config.language, SegmentationMode::SingleLine)
            .with_whitelist(NAME_WHITELIST)
            .with_options(&NAME_RECOGNITION_OPTIONS);
        let text = ZoneKind::Name.normalize(&self.recognize(recognizer, &prepared, &request, cell));
        if text.chars().count() > 1 {
            return (text, prepared);
        }

        let softened = soften(&upscale_to(raw_crop, self.config.name_min_dim));
        let retry_request = RecognitionRequest {
            segmentation: SegmentationMode::SingleBlock,
            ..request
        };
        let retry = ZoneKind::Name.normalize(&self.recognize(recognizer, &softened, &retry_request, cell));
        let best = if retry.chars().count() > text.chars().count() {
            retry
        } else {
            text
        };
        (best, softened)
    }

    /// Finer local threshold with table rules subtracted, polarity fixed so
    /// the background is light.
    fn strip_vertical_rules(&self, raw_crop: &GrayImage) -> GrayImage {
        let local = adaptive_threshold_gaussian(
            raw_crop,
            self.config.name_block_size,
            self.config.name_threshold_offset,
            Polarity::Binary,
        );
        let kernel = (local.height() / NAME_RULE_KERNEL_DIVISOR).max(NAME_RULE_KERNEL_MIN);
        let rules = open_line(&local, Axis::Vertical, kernel, 1);
        let cleaned = subtract(&local, &rules);
        if mean_intensity(&cleaned) < 127.0 {
            invert(&cleaned)
        } else {
            cleaned
        }
    }

    fn recognize(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &GrayImage,
        request: &RecognitionRequest<'_>,
        cell: GridCell,
    ) -> String {
        match recognizer.recognize(image, request) {
            Ok(raw) => clean_recognized(&raw),
            Err(err) => {
                warn!(
                    stage = %ProcessingStage::Recognition,
                    row = cell.row,
                    col = cell.col,
                    recognizer = recognizer.name(),
                    error = %err,
                    "cell recognition failed; leaving it empty"
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecognitionError;
    use crate::domain::GridLayout;
    use crate::processors::CellBox;
    use image::Luma;
    use std::sync::Mutex;

    /// Answers by whitelist, so each zone gets a fixed reply.
    struct ZoneStub {
        header: &'static str,
        name: Vec<&'static str>,
        body: &'static str,
        calls: Mutex<Vec<SegmentationMode>>,
    }

    impl ZoneStub {
        fn new(header: &'static str, name: Vec<&'static str>, body: &'static str) -> Self {
            Self {
                header,
                name,
                body,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for ZoneStub {
        fn recognize(
            &self,
            _region: &GrayImage,
            request: &RecognitionRequest<'_>,
        ) -> Result<String, RecognitionError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.segmentation);
            Ok(match request.whitelist {
                Some(DIGIT_WHITELIST) => self.header.to_string(),
                Some(BODY_WHITELIST) => self.body.to_string(),
                Some(NAME_WHITELIST) => {
                    let attempt = calls.len() - 1;
                    self.name.get(attempt).copied().unwrap_or_default().to_string()
                }
                _ => String::new(),
            })
        }
    }

    struct Failing;

    impl TextRecognizer for Failing {
        fn recognize(
            &self,
            _region: &GrayImage,
            _request: &RecognitionRequest<'_>,
        ) -> Result<String, RecognitionError> {
            Err(RecognitionError::Engine {
                message: "boom".into(),
            })
        }
    }

    fn page() -> GrayImage {
        GrayImage::from_pixel(120, 60, Luma([255]))
    }

    fn one_cell(row: usize, col: usize) -> CellSet {
        CellSet::new(
            vec![GridCell::new(row, col, CellBox::new(10, 10, 40, 30))],
            GridLayout::Rectangular,
        )
    }

    #[test]
    fn test_header_cell_uses_digit_whitelist() {
        let stub = ZoneStub::new("07", vec![], "");
        let cells = CellClassifier::default().classify(&one_cell(0, 2), &page(), &stub, &DebugSink::disabled());
        assert_eq!(cells[0].zone(), ZoneKind::Header);
        assert_eq!(cells[0].text(), "7");
        assert_eq!(*stub.calls.lock().unwrap(), vec![SegmentationMode::SingleLine]);
    }

    #[test]
    fn test_body_cell_is_normalized() {
        let stub = ZoneStub::new("", vec![], "s v v");
        let cells = CellClassifier::default().classify(&one_cell(1, 1), &page(), &stub, &DebugSink::disabled());
        assert_eq!(cells[0].zone(), ZoneKind::Body);
        assert_eq!(cells[0].text(), "SV");
    }

    #[test]
    fn test_short_name_is_retried_and_longer_reading_kept() {
        let stub = ZoneStub::new("", vec!["J", "Jana Nová"], "");
        let cells = CellClassifier::default().classify(&one_cell(1, 0), &page(), &stub, &DebugSink::disabled());
        assert_eq!(cells[0].zone(), ZoneKind::Name);
        assert_eq!(cells[0].text(), "Jana Nová");
        assert_eq!(
            *stub.calls.lock().unwrap(),
            vec![SegmentationMode::SingleLine, SegmentationMode::SingleBlock]
        );
    }

    #[test]
    fn test_good_name_is_not_retried() {
        let stub = ZoneStub::new("", vec!["Petr | Novák"], "");
        let cells = CellClassifier::default().classify(&one_cell(2, 0), &page(), &stub, &DebugSink::disabled());
        assert_eq!(cells[0].text(), "Petr Novák");
        assert_eq!(stub.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_recognition_failure_degrades_to_empty() {
        let cells = CellClassifier::default().classify(&one_cell(1, 1), &page(), &Failing, &DebugSink::disabled());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].text(), "");
    }

    #[test]
    fn test_degenerate_crop_is_empty_without_recognition() {
        let stub = ZoneStub::new("5", vec![], "R");
        let set = CellSet::new(
            vec![GridCell::new(0, 0, CellBox::new(10, 10, 4, 4))],
            GridLayout::Rectangular,
        );
        let cells = CellClassifier::default().classify(&set, &page(), &stub, &DebugSink::disabled());
        assert_eq!(cells[0].text(), "");
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parallel_run_keeps_cell_order() {
        let stub = ZoneStub::new("3", vec![], "D");
        let cells: Vec<GridCell> = (0..4)
            .flat_map(|r| (1..6).map(move |c| GridCell::new(r, c, CellBox::new(c as u32 * 20, r as u32 * 15, 20, 15))))
            .collect();
        let set = CellSet::new(cells, GridLayout::Rectangular);
        let gray = page();

        let sequential = CellClassifier::default().classify(&set, &gray, &stub, &DebugSink::disabled());
        let parallel = CellClassifier::default()
            .with_parallel_policy(ParallelPolicy::new().with_parallel_cells(true).with_cell_threshold(1))
            .classify(&set, &gray, &stub, &DebugSink::disabled());
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[0].text(), "3");
        assert_eq!(parallel[6].text(), "D");
    }

    #[test]
    fn test_cell_crops_are_written_when_debugging() {
        let dir = tempfile::tempdir().unwrap();
        let stub = ZoneStub::new("1", vec![], "");
        CellClassifier::default().classify(
            &one_cell(0, 3),
            &page(),
            &stub,
            &DebugSink::new(Some(dir.path().to_path_buf())),
        );
        assert!(dir.path().join("cell_r0_c3.png").is_file());
    }
}
