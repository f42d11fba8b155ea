//! Spreadsheet reader (xlsx / xls) backed by calamine.

use super::{ColumnBuilder, generated_headers, normalise_headers};
use crate::config::ProfilingConfig;
use crate::error::{ProfilingError, Result};
use crate::table::{Cell, Table};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

/// Text form used for spreadsheet date cells.
pub(crate) const SPREADSHEET_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read the first worksheet of a workbook held in memory.
pub(crate) fn read_spreadsheet(bytes: &[u8], config: &ProfilingConfig) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ProfilingError::parse(format!("unreadable workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    debug!(sheets = ?sheet_names, "Workbook opened");

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ProfilingError::parse("workbook has no worksheets"))?
        .map_err(|e| ProfilingError::parse(format!("failed to read worksheet: {}", e)))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Err(ProfilingError::EmptyDataset);
    }

    let mut rows = range.rows();
    let mut builder = ColumnBuilder::new(config, width);

    let names = if config.has_header {
        let header = rows
            .next()
            .map(|row| row.iter().map(header_text).collect())
            .unwrap_or_default();
        normalise_headers(header)
    } else {
        generated_headers(width)
    };

    for row in rows {
        let cells: Vec<Cell> = row
            .iter()
            .map(|data| spreadsheet_cell(data, &builder))
            .collect();
        builder.push_row(cells)?;
    }

    builder.finish(names)
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Float(f) => format_float(*f),
        other => other.to_string(),
    }
}

/// Convert a calamine cell into a table cell.
///
/// Errors such as `#DIV/0!` become [`Cell::Invalid`]; dates are rendered as
/// `%Y-%m-%d %H:%M:%S`; integral floats drop their fractional part.
fn spreadsheet_cell(data: &Data, builder: &ColumnBuilder<'_>) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => builder.text_cell(s),
        Data::Int(i) => Cell::Value(i.to_string()),
        Data::Float(f) => Cell::Value(format_float(*f)),
        Data::Bool(b) => Cell::Value(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Value(naive.format(SPREADSHEET_DATETIME_FORMAT).to_string()),
            None => Cell::Invalid(dt.to_string()),
        },
        Data::Error(e) => Cell::Invalid(e.to_string()),
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
