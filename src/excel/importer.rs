//! Spreadsheet parser - uploaded workbook bytes → headers + rows

use crate::error::{SheetError, SheetResult};
use crate::types::{CellValue, ParsedSheet};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Reads the first worksheet of an uploaded workbook.
///
/// The format is sniffed from the content (xlsx, xlsm, xlsb, xls, ods), so
/// no extension filtering happens here.
#[derive(Debug, Default, Clone, Copy)]
pub struct SheetParser;

impl SheetParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a workbook held in memory
    pub fn parse(&self, bytes: &[u8]) -> SheetResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        // Only the first sheet is read; the rest are ignored
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SheetError::Decode("Workbook has no worksheets".to_string()))??;

        let sheet = self.process_range(&range);
        debug!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            "Parsed first worksheet"
        );
        Ok(sheet)
    }

    /// Parse a workbook on disk
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> SheetResult<ParsedSheet> {
        let bytes = std::fs::read(path.as_ref())?;
        self.parse(&bytes)
    }

    /// Split a used range into header row (row 0) and data rows.
    ///
    /// Cells are indexed from the start of the used range in both
    /// directions: the first used row is the header and the first used
    /// column is index 0.
    fn process_range(&self, range: &Range<Data>) -> ParsedSheet {
        let mut rows = range.rows();

        let headers = match rows.next() {
            Some(first) => trim_trailing(first)
                .iter()
                .map(|cell| cell.to_string())
                .collect(),
            None => return ParsedSheet::default(),
        };

        let rows = rows
            .map(|row| trim_trailing(row).iter().map(convert_cell).collect())
            .collect();

        ParsedSheet::new(headers, rows)
    }
}

/// Drop blank cells after the last non-blank one
fn trim_trailing(row: &[Data]) -> &[Data] {
    let len = row
        .iter()
        .rposition(|cell| !matches!(cell, Data::Empty))
        .map_or(0, |idx| idx + 1);
    &row[..len]
}

/// Convert a data cell, coercing numeric-looking text to a number
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        // Dates come through as their serial number
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::coerce(s),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}
