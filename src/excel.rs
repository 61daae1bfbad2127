//! Excel import/export for forecast rows.
//!
//! Import reads the first worksheet of an `.xlsx`/`.xls` file, skips the
//! header row and maps columns 1-5 positionally to (sheet name, forecast
//! type, month, budget, actuals); the engine computes ETC/EAC and defaults
//! anything absent or invalid. Export writes a styled table of all seven
//! columns. Delivering the exported bytes to the user (file dialog, browser
//! download) is the host application's job; this module only produces them.

use crate::engine::{self, RawRow};
use crate::model::{ForecastRecord, COLUMN_HEADERS};
use crate::Result;
use anyhow::{bail, Context};
use calamine::{Data, Reader};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;
use tracing::debug;

/// Filename used when the caller does not supply one.
pub const DEFAULT_EXPORT_FILENAME: &str = "forecast-export.xlsx";

const EXPORT_SHEET_NAME: &str = "Forecast";
const HEADER_FILL: u32 = 0x1E3A5F;
const BORDER_COLOR: u32 = 0xD0D0D0;
const HEADER_ROW_HEIGHT: f64 = 24.0;
const DATA_ROW_HEIGHT: f64 = 22.0;
const COLUMN_WIDTHS: [f64; 7] = [25.0, 18.0, 12.0, 15.0, 15.0, 15.0, 15.0];

/// Imports forecast rows from an Excel file.
///
/// Errors when the file cannot be opened, has no worksheet, or has no data
/// rows below the header; malformed cell values are never an error and are
/// coerced by the engine instead.
pub fn import_file(path: impl AsRef<Path>) -> Result<Vec<ForecastRecord>> {
    let path = path.as_ref();
    let mut workbook = calamine::open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook at {}", path.display()))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        bail!("No worksheet found in the Excel file");
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read worksheet '{sheet_name}'"))?;

    let records: Vec<ForecastRecord> = range
        .rows()
        .skip(1) // header row
        .map(|row| engine::import_record(&raw_row(row)))
        .collect();

    if records.is_empty() {
        bail!("No data found in the Excel file; data must start at row 2");
    }
    debug!("Imported {} rows from {}", records.len(), path.display());
    Ok(records)
}

fn raw_row(row: &[Data]) -> RawRow {
    RawRow {
        sheet_name: cell_text(row, 0),
        forecast_type: cell_text(row, 1),
        month: cell_text(row, 2),
        budget: cell_text(row, 3),
        actuals: cell_text(row, 4),
    }
}

/// Converts a cell to text for the engine's coercion rules. Empty cells map
/// to `None` so the engine can apply its defaults.
fn cell_text(row: &[Data], ix: usize) -> Option<String> {
    match row.get(ix)? {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Exports forecast rows as xlsx bytes, for callers that deliver the file
/// themselves.
pub fn export_to_buffer(records: &[ForecastRecord]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(records)?;
    let buffer = workbook
        .save_to_buffer()
        .context("Failed to serialize the Excel workbook")?;
    Ok(buffer)
}

/// Exports forecast rows to an xlsx file at `path`.
pub fn export_to_file(records: &[ForecastRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut workbook = build_workbook(records)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook to {}", path.display()))?;
    debug!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}

fn build_workbook(records: &[ForecastRecord]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header = Format::new()
        .set_bold()
        .set_font_color(0xFFFFFF)
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER_COLOR);

    let text = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER_COLOR);

    let number = Format::new()
        .set_num_format("#,##0.00")
        .set_align(FormatAlign::Right)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER_COLOR);

    for (col, header_name) in COLUMN_HEADERS.iter().enumerate() {
        worksheet.set_column_width(col as u16, COLUMN_WIDTHS[col])?;
        worksheet.write_string_with_format(0, col as u16, *header_name, &header)?;
    }
    worksheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    for (ix, record) in records.iter().enumerate() {
        let row = ix as u32 + 1;
        worksheet.write_string_with_format(row, 0, &record.sheet_name, &text)?;
        worksheet.write_string_with_format(row, 1, record.forecast_type.to_string(), &text)?;
        worksheet.write_string_with_format(row, 2, record.month.to_string(), &text)?;
        worksheet.write_number_with_format(row, 3, record.budget.to_f64(), &number)?;
        worksheet.write_number_with_format(row, 4, record.actuals.to_f64(), &number)?;
        worksheet.write_number_with_format(row, 5, record.etc.to_f64(), &number)?;
        worksheet.write_number_with_format(row, 6, record.eac.to_f64(), &number)?;
        worksheet.set_row_height(row, DATA_ROW_HEIGHT)?;
    }

    Ok(workbook)
}
