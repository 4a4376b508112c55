//! # Stage Definition: Table Assembly
//!
//! - **Inputs**: classified [`Cell`]s.
//! - **Outputs**: a rectangular [`Table`] whose column names come from the
//!   header row and whose first column is labelled `JMENO`.
//! - **Error Behavior**: [`TableAssembler::assemble`] turns zero cells into an
//!   empty table; [`TableAssembler::assemble_strict`] reports `EmptyInput`.

use crate::core::{OCRError, OcrResult, ProcessingStage};
use crate::domain::vocabulary::placeholder_column_name;
use crate::domain::{Cell, NAME_COLUMN_LABEL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io;
use tracing::debug;

/// Named columns over rows of normalized strings. Every row has exactly
/// `columns.len()` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Value at `row` under the first column called `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// One JSON object per row keyed by column name, with keys in column
    /// order. When two columns share a name the later value wins.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                    .collect()
            })
            .collect()
    }

    /// Writes the header line and all rows as UTF-8 CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> OcrResult<()> {
        let csv_error =
            |err: csv::Error| OCRError::processing(ProcessingStage::TableAssembly, "writing CSV", err);

        let mut writer = csv::Writer::from_writer(writer);
        if !self.columns.is_empty() {
            writer.write_record(&self.columns).map_err(csv_error)?;
        }
        for row in &self.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> OcrResult<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|err| {
            OCRError::processing(ProcessingStage::TableAssembly, "CSV output is not UTF-8", err)
        })
    }
}

/// Folds classified cells into a [`Table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TableAssembler {
    header_row_index: usize,
}

impl TableAssembler {
    pub fn new(header_row_index: usize) -> Self {
        Self { header_row_index }
    }

    /// Builds the table; zero cells give an empty table.
    ///
    /// The header row's values become column names (`col_<i>` where empty)
    /// and the row is removed. If the extent has no such row, every column
    /// gets a placeholder name and no row is removed.
    pub fn assemble(&self, cells: &[Cell]) -> Table {
        let Some(rows) = cells.iter().map(|c| c.row() + 1).max() else {
            return Table::default();
        };
        let cols = cells.iter().map(|c| c.col() + 1).max().unwrap_or(0);

        let mut grid = vec![vec![String::new(); cols]; rows];
        for cell in cells {
            grid[cell.row()][cell.col()] = cell.text().to_string();
        }

        let header = (self.header_row_index < rows).then(|| grid.remove(self.header_row_index));
        let mut columns: Vec<String> = (0..cols)
            .map(|i| match header.as_ref().map(|h| h[i].as_str()) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => placeholder_column_name(i),
            })
            .collect();
        if let Some(first) = columns.first_mut() {
            *first = NAME_COLUMN_LABEL.to_string();
        }

        debug!(rows = grid.len(), cols, "assembled table");
        Table {
            columns,
            rows: grid,
        }
    }

    /// Like [`assemble`](Self::assemble) but rejects an empty cell list.
    pub fn assemble_strict(&self, cells: &[Cell]) -> OcrResult<Table> {
        if cells.is_empty() {
            return Err(OCRError::empty_input("no classified cells to assemble"));
        }
        Ok(self.assemble(cells))
    }
}
