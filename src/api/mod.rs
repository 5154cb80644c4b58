//! SheetStore API Server module
//!
//! Provides the HTTP REST API behind the upload page.
//! Run with `sheetstore serve` or `sheetstore-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
