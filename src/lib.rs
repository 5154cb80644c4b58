//! SheetStore - spreadsheet import/export for a hosted document store
//!
//! Upload a spreadsheet, preview its rows, push them into a document
//! collection in one atomic batch, list what is stored, and export the
//! stored records back to `.xlsx`.
//!
//! # Features
//!
//! - First-sheet parsing of xlsx/xls/xlsb/ods with numeric coercion
//! - Explicit column mapping (`name` / `age` column positions)
//! - Cloud Firestore REST client plus an in-memory store
//! - Import dialog state machine with explicit failure state
//! - CLI and HTTP API front ends
//!
//! # Example
//!
//! ```no_run
//! use royalbit_sheetstore::controller::ImportController;
//! use royalbit_sheetstore::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> royalbit_sheetstore::SheetResult<()> {
//! let bytes = std::fs::read("users.xlsx")?;
//! let mut controller = ImportController::new(Arc::new(MemoryStore::new()));
//!
//! controller.open()?;
//! let sheet = controller.select_file(&bytes)?;
//! println!("Previewing {} rows", sheet.rows.len());
//!
//! let created = controller.submit().await?;
//! println!("Created {} records, {} in store", created, controller.users().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod excel;
pub mod logging;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{SheetError, SheetResult};
pub use types::{CellValue, ColumnMapping, ParsedSheet, Record, StoredRecord};
