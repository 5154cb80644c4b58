//! Excel import/export for user records
//!
//! - Import: workbook bytes → header row + data rows (first sheet only)
//! - Export: records → single-sheet .xlsx

mod exporter;
mod importer;

pub use exporter::RecordExporter;
pub use importer::SheetParser;
