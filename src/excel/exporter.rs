//! Spreadsheet writer - stored records → .xlsx

use crate::error::{SheetError, SheetResult};
use crate::types::{CellValue, ColumnMapping, Record, MAX_COLUMN_INDEX};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// Header labels written when the header row is enabled
const NAME_HEADER: &str = "Name";
const AGE_HEADER: &str = "Age";

/// Writes records to a single worksheet, one row per record.
///
/// No header row by default and no styling. Without a header the first
/// record is read back as the header on re-import; enable `with_header`
/// when the file is meant to be imported again.
#[derive(Debug, Clone)]
pub struct RecordExporter {
    mapping: ColumnMapping,
    header_row: bool,
}

impl Default for RecordExporter {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

impl RecordExporter {
    /// Create an exporter placing fields at the given column offsets
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            header_row: false,
        }
    }

    pub fn with_header(mut self, header_row: bool) -> Self {
        self.header_row = header_row;
        self
    }

    /// Serialize the records to .xlsx bytes
    pub fn to_bytes(&self, records: &[Record]) -> SheetResult<Vec<u8>> {
        let mut workbook = self.build(records)?;
        let bytes = workbook.save_to_buffer()?;
        debug!(records = records.len(), bytes = bytes.len(), "Built workbook");
        Ok(bytes)
    }

    /// Write the records to an .xlsx file
    pub fn save(&self, records: &[Record], output_path: &Path) -> SheetResult<()> {
        let mut workbook = self.build(records)?;
        workbook.save(output_path)?;
        Ok(())
    }

    fn build(&self, records: &[Record]) -> SheetResult<Workbook> {
        let name_col = column(self.mapping.name)?;
        let age_col = column(self.mapping.age)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let mut row = 0u32;
        if self.header_row {
            worksheet.write_string(row, name_col, NAME_HEADER)?;
            worksheet.write_string(row, age_col, AGE_HEADER)?;
            row += 1;
        }

        for record in records {
            write_cell(worksheet, row, name_col, &record.name)?;
            write_cell(worksheet, row, age_col, &record.age)?;
            row += 1;
        }

        Ok(workbook)
    }
}

/// Worksheet column for a mapped index
fn column(index: usize) -> SheetResult<u16> {
    u16::try_from(index)
        .ok()
        .filter(|_| index <= MAX_COLUMN_INDEX)
        .ok_or_else(|| {
            SheetError::Export(format!(
                "Column index {} is past the last worksheet column ({})",
                index, MAX_COLUMN_INDEX
            ))
        })
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> SheetResult<()> {
    match value {
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}
