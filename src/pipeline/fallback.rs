//! # Stage Definition: Fallback Zoning
//!
//! - **Inputs**: the inverted binarization of the page (ink = 255), as
//!   produced by [`GridDetector::line_masks`](super::GridDetector::line_masks).
//! - **Outputs**: a possibly ragged [`CellSet`] built from the bounding boxes
//!   of top-level connected regions.
//! - **Error Behavior**: `OCRError::Detection` at `FallbackZoning` when no
//!   region survives the area filter.
//!
//! Column indices are positions within a row, not aligned across rows.

use crate::core::config::FallbackConfig;
use crate::core::{OCRError, OcrResult, ProcessingStage};
use crate::domain::{CellSet, GridCell, GridLayout};
use crate::processors::CellBox;
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use tracing::{debug, instrument};

/// Pseudo-grid derived from region bounding boxes when no ruled lines exist.
#[derive(Debug, Clone, Default)]
pub struct FallbackZoner {
    config: FallbackConfig,
}

impl FallbackZoner {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    #[instrument(skip_all, name = "fallback_zoning")]
    pub fn detect(&self, binary: &GrayImage) -> OcrResult<CellSet> {
        let boxes = self.region_boxes(binary);
        if boxes.is_empty() {
            return Err(OCRError::detection(
                ProcessingStage::FallbackZoning,
                format!(
                    "no connected region with area >= {} px",
                    self.config.min_area
                ),
            ));
        }

        let rows = group_rows(boxes, self.config.row_tolerance);
        debug!(rows = rows.len(), "grouped fallback regions into rows");

        let cells = rows
            .into_iter()
            .enumerate()
            .flat_map(|(row, boxes)| {
                boxes
                    .into_iter()
                    .enumerate()
                    .map(move |(col, bbox)| GridCell::new(row, col, bbox))
            })
            .collect();
        Ok(CellSet::new(cells, GridLayout::Ragged))
    }

    /// Bounding boxes of the outermost regions, noise removed, sorted by
    /// top edge then left edge.
    pub fn region_boxes(&self, binary: &GrayImage) -> Vec<CellBox> {
        let min_area = self.config.min_area as u64;
        let mut boxes: Vec<CellBox> = find_contours::<u32>(binary)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(|c| CellBox::bounding(&c.points))
            .filter(|b| b.area() >= min_area)
            .collect();
        boxes.sort_by_key(|b| (b.y, b.x));
        boxes
    }
}

/// Greedy row partition of boxes sorted by `(y, x)`: a box joins the current
/// row while its top edge is less than `tolerance` below the row's first box.
/// Each row is returned sorted left to right.
fn group_rows(sorted: Vec<CellBox>, tolerance: u32) -> Vec<Vec<CellBox>> {
    let mut rows: Vec<Vec<CellBox>> = Vec::new();
    for bbox in sorted {
        match rows.last_mut() {
            Some(row) if bbox.y - row[0].y < tolerance => row.push(bbox),
            _ => rows.push(vec![bbox]),
        }
    }
    for row in &mut rows {
        row.sort_by_key(|b| b.x);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn page_with_blocks(blocks: &[CellBox]) -> GrayImage {
        GrayImage::from_fn(300, 200, |x, y| {
            let inside = blocks
                .iter()
                .any(|b| x >= b.x && x < b.right() && y >= b.y && y < b.bottom());
            if inside { Luma([255]) } else { Luma([0]) }
        })
    }

    #[test]
    fn test_ragged_rows_by_position() {
        let page = page_with_blocks(&[
            CellBox::new(120, 12, 30, 20),
            CellBox::new(10, 10, 30, 20),
            CellBox::new(60, 15, 30, 20),
            CellBox::new(200, 80, 30, 20),
            CellBox::new(40, 85, 30, 20),
            // noise
            CellBox::new(250, 150, 5, 5),
        ]);
        let cells = FallbackZoner::default().detect(&page).unwrap();
        assert_eq!(cells.layout(), GridLayout::Ragged);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells.row_count(), 2);

        let row0: Vec<u32> = cells.cells().iter().filter(|c| c.row == 0).map(|c| c.bbox.x).collect();
        assert_eq!(row0, vec![10, 60, 120]);

        let second_row: Vec<(usize, u32)> = cells
            .cells()
            .iter()
            .filter(|c| c.row == 1)
            .map(|c| (c.col, c.bbox.x))
            .collect();
        assert_eq!(second_row, vec![(0, 40), (1, 200)]);
    }

    #[test]
    fn test_row_compares_against_first_box() {
        let rows = group_rows(
            vec![
                CellBox::new(0, 0, 10, 10),
                CellBox::new(20, 15, 10, 10),
                CellBox::new(40, 25, 10, 10),
            ],
            20,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1][0].y, 25);
    }

    #[test]
    fn test_nested_regions_count_once() {
        // A frame with a block inside its hole.
        let page = GrayImage::from_fn(120, 120, |x, y| {
            let frame = (10..110).contains(&x) && (10..110).contains(&y)
                && !((20..100).contains(&x) && (20..100).contains(&y));
            let inner = (40..80).contains(&x) && (40..80).contains(&y);
            if frame || inner { Luma([255]) } else { Luma([0]) }
        });
        let boxes = FallbackZoner::default().region_boxes(&page);
        assert_eq!(boxes, vec![CellBox::new(10, 10, 100, 100)]);
    }

    #[test]
    fn test_blank_page_fails() {
        let page = GrayImage::from_pixel(50, 50, Luma([0]));
        let err = FallbackZoner::default().detect(&page).unwrap_err();
        assert_eq!(err.stage(), Some(ProcessingStage::FallbackZoning));
    }
}
