//! Table output: CSV, JSON records and a console preview.

use roster_ocr::core::OcrResult;
use roster_ocr::pipeline::Table;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Spreadsheet applications need the byte-order mark to detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const PREVIEW_ROWS: usize = 10;
const PREVIEW_COL_WIDTH: usize = 40;

pub fn write_csv_file(path: &Path, table: &Table) -> OcrResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(UTF8_BOM)?;
    table.write_csv(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_file(
    path: &Path,
    table: &Table,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &table.to_records())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Prints the first rows of `table` with columns padded to a common width.
pub fn print_preview(table: &Table) {
    if table.is_empty() {
        println!("(empty table)");
        return;
    }
    let shown: Vec<&Vec<String>> = table.rows.iter().take(PREVIEW_ROWS).collect();
    let widths: Vec<usize> = (0..table.column_count())
        .map(|i| {
            shown
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(table.columns[i].chars().count()))
                .max()
                .unwrap_or(0)
                .min(PREVIEW_COL_WIDTH)
        })
        .collect();

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| {
                let clipped: String = cell.chars().take(width).collect();
                format!("{clipped:<width$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", render(&table.columns));
    for row in shown {
        println!("{}", render(row));
    }
    if table.row_count() > PREVIEW_ROWS {
        println!("... ({} rows total)", table.row_count());
    }
}
