//! Cells of a detected grid and their structural zones.

use super::normalize::{normalize_body, normalize_header, normalize_name};
use crate::processors::CellBox;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structural role of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Day-number row.
    Header,
    /// Person-name column.
    Name,
    /// Shift codes.
    Body,
}

impl ZoneKind {
    /// Zone of the cell at `(row, col)`. The header row takes precedence over
    /// the name column.
    pub fn of(row: usize, col: usize, header_row_index: usize, name_col_index: usize) -> Self {
        if row == header_row_index {
            ZoneKind::Header
        } else if col == name_col_index {
            ZoneKind::Name
        } else {
            ZoneKind::Body
        }
    }

    /// Maps cleaned recognizer output onto this zone's vocabulary.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            ZoneKind::Header => normalize_header(raw),
            ZoneKind::Name => normalize_name(raw),
            ZoneKind::Body => normalize_body(raw),
        }
    }
}

/// A located cell before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub bbox: CellBox,
}

impl GridCell {
    pub fn new(row: usize, col: usize, bbox: CellBox) -> Self {
        Self { row, col, bbox }
    }
}

/// How a [`CellSet`] was laid out by its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridLayout {
    /// Every `(row, col)` in `rows × cols` is present.
    Rectangular,
    /// Rows may have different lengths.
    Ragged,
}

/// The cells found on one page, keyed uniquely by `(row, col)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSet {
    cells: Vec<GridCell>,
    layout: GridLayout,
}

impl CellSet {
    /// Builds a cell set, dropping any later cell whose `(row, col)` key was
    /// already taken.
    pub fn new(cells: Vec<GridCell>, layout: GridLayout) -> Self {
        let mut seen = HashSet::with_capacity(cells.len());
        let cells = cells
            .into_iter()
            .filter(|cell| seen.insert((cell.row, cell.col)))
            .collect();
        Self { cells, layout }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<GridCell> {
        self.cells
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `max(row) + 1`, or 0 when empty.
    pub fn row_count(&self) -> usize {
        self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0)
    }

    /// `max(col) + 1`, or 0 when empty.
    pub fn col_count(&self) -> usize {
        self.cells.iter().map(|c| c.col + 1).max().unwrap_or(0)
    }

    /// True if every `(row, col)` pair of the bounding extent is present.
    pub fn is_complete(&self) -> bool {
        self.len() == self.row_count() * self.col_count()
    }
}

/// A cell whose zone has been assigned and whose text has been recognized
/// and normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    row: usize,
    col: usize,
    bbox: CellBox,
    zone: ZoneKind,
    text: String,
}

impl Cell {
    pub fn new(grid_cell: GridCell, zone: ZoneKind, text: String) -> Self {
        Self {
            row: grid_cell.row,
            col: grid_cell.col,
            bbox: grid_cell.bbox,
            zone,
            text,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn bbox(&self) -> CellBox {
        self.bbox
    }

    pub fn zone(&self) -> ZoneKind {
        self.zone
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize) -> GridCell {
        GridCell::new(row, col, CellBox::new(col as u32 * 10, row as u32 * 10, 10, 10))
    }

    #[test]
    fn test_zone_precedence() {
        assert_eq!(ZoneKind::of(0, 0, 0, 0), ZoneKind::Header);
        assert_eq!(ZoneKind::of(0, 3, 0, 0), ZoneKind::Header);
        assert_eq!(ZoneKind::of(2, 0, 0, 0), ZoneKind::Name);
        assert_eq!(ZoneKind::of(2, 3, 0, 0), ZoneKind::Body);
        assert_eq!(ZoneKind::of(1, 1, 1, 1), ZoneKind::Header);
        assert_eq!(ZoneKind::of(0, 1, 1, 1), ZoneKind::Name);
    }

    #[test]
    fn test_zone_dispatches_normalizer() {
        assert_eq!(ZoneKind::Header.normalize("07"), "7");
        assert_eq!(ZoneKind::Name.normalize("J0hn#99"), "Jhn");
        assert_eq!(ZoneKind::Body.normalize("svv"), "SV");
    }

    #[test]
    fn test_cell_set_extent_and_completeness() {
        let set = CellSet::new(
            vec![cell(0, 0), cell(0, 1), cell(1, 0), cell(1, 1)],
            GridLayout::Rectangular,
        );
        assert_eq!(set.row_count(), 2);
        assert_eq!(set.col_count(), 2);
        assert!(set.is_complete());

        let ragged = CellSet::new(vec![cell(0, 0), cell(0, 1), cell(1, 0)], GridLayout::Ragged);
        assert!(!ragged.is_complete());
    }

    #[test]
    fn test_duplicate_keys_are_dropped() {
        let set = CellSet::new(vec![cell(0, 0), cell(0, 0), cell(0, 1)], GridLayout::Ragged);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_empty_set() {
        let set = CellSet::new(Vec::new(), GridLayout::Ragged);
        assert!(set.is_empty());
        assert_eq!(set.row_count(), 0);
        assert!(set.is_complete());
    }
}
