//! # Stage Definition: Grid Detection
//!
//! - **Inputs**: preprocessed grayscale page.
//! - **Outputs**: a rectangular [`CellSet`], or [`NoGridFound`] when either
//!   axis yields no ruled line.
//! - **Logging**: traces the number of clustered row/column lines.
//! - **Invariants**: cell indices are sequential over the line pairs that
//!   survive the minimum-span filter, so the set is always complete.

use crate::core::NoGridFound;
use crate::core::config::GridConfig;
use crate::domain::{CellSet, GridCell, GridLayout};
use crate::processors::{Axis, CellBox, Polarity, adaptive_threshold_mean, cluster_with_tolerance, open_line};
use image::GrayImage;
use tracing::{debug, instrument};

/// The binarized page and its two stroke masks.
#[derive(Debug, Clone)]
pub struct GridMasks {
    /// Inverted binarization of the page (ink = 255).
    pub binary: GrayImage,
    /// Long horizontal strokes only.
    pub horizontal: GrayImage,
    /// Long vertical strokes only.
    pub vertical: GrayImage,
}

/// Ruled-line grid detector based on directional morphological opening.
#[derive(Debug, Clone, Default)]
pub struct GridDetector {
    config: GridConfig,
}

impl GridDetector {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Detects the grid of `gray`.
    pub fn detect(&self, gray: &GrayImage) -> Result<CellSet, NoGridFound> {
        self.detect_in_masks(&self.line_masks(gray))
    }

    /// Binarizes `gray` and isolates its long horizontal and vertical strokes.
    pub fn line_masks(&self, gray: &GrayImage) -> GridMasks {
        let binary = adaptive_threshold_mean(
            gray,
            self.config.block_size,
            self.config.threshold_offset,
            Polarity::Inverted,
        );
        let scale = self.kernel_scale(gray.width(), gray.height());
        let horizontal = open_line(
            &binary,
            Axis::Horizontal,
            scale * self.config.horizontal_factor,
            self.config.iterations,
        );
        let vertical = open_line(
            &binary,
            Axis::Vertical,
            scale * self.config.vertical_factor,
            self.config.iterations,
        );
        GridMasks {
            binary,
            horizontal,
            vertical,
        }
    }

    /// Builds the cell set from precomputed stroke masks.
    #[instrument(skip_all, name = "grid_detection")]
    pub fn detect_in_masks(&self, masks: &GridMasks) -> Result<CellSet, NoGridFound> {
        let row_lines = cluster_with_tolerance(&row_candidates(&masks.horizontal), self.config.row_tolerance);
        let col_lines = cluster_with_tolerance(&col_candidates(&masks.vertical), self.config.col_tolerance);
        debug!(rows = row_lines.len(), cols = col_lines.len(), "clustered grid lines");

        if row_lines.is_empty() || col_lines.is_empty() {
            return Err(NoGridFound {
                horizontal: row_lines.len(),
                vertical: col_lines.len(),
            });
        }
        Ok(cells_from_lines(&row_lines, &col_lines, self.config.min_cell_span))
    }

    /// Base structuring-element length for a page of the given size.
    pub fn kernel_scale(&self, width: u32, height: u32) -> u32 {
        (width.min(height) / self.config.kernel_divisor.max(1)).max(self.config.min_kernel)
    }
}

/// Y coordinates of rows holding any horizontal-stroke pixel.
fn row_candidates(mask: &GrayImage) -> Vec<u32> {
    mask.rows()
        .enumerate()
        .filter_map(|(y, mut row)| row.any(|p| p[0] > 0).then_some(y as u32))
        .collect()
}

/// X coordinates of columns holding any vertical-stroke pixel.
fn col_candidates(mask: &GrayImage) -> Vec<u32> {
    let mut hit = vec![false; mask.width() as usize];
    for (x, _, p) in mask.enumerate_pixels() {
        if p[0] > 0 {
            hit[x as usize] = true;
        }
    }
    hit.iter()
        .enumerate()
        .filter_map(|(x, &h)| h.then_some(x as u32))
        .collect()
}

/// Cartesian product of consecutive line pairs. Pairs narrower than
/// `min_span` are skipped and do not consume an index.
pub fn cells_from_lines(row_lines: &[u32], col_lines: &[u32], min_span: u32) -> CellSet {
    let spans = |lines: &[u32]| -> Vec<(u32, u32)> {
        lines
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .filter(|(a, b)| b - a >= min_span)
            .collect()
    };
    let row_spans = spans(row_lines);
    let col_spans = spans(col_lines);

    let mut cells = Vec::with_capacity(row_spans.len() * col_spans.len());
    for (ri, &(y1, y2)) in row_spans.iter().enumerate() {
        for (ci, &(x1, x2)) in col_spans.iter().enumerate() {
            cells.push(GridCell::new(ri, ci, CellBox::between(x1, x2, y1, y2)));
        }
    }
    CellSet::new(cells, GridLayout::Rectangular)
}
