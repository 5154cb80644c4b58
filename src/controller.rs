//! Import/export controller
//!
//! Owns the import dialog state and the current record list, and ties the
//! parser, the store and the writer together:
//!
//! ```text
//! Closed ──open──▶ AwaitingFile ──select_file──▶ Previewing ──submit──▶ Submitting ──▶ Closed
//!    ▲                  │  │                          │                      │
//!    └──────cancel──────┘  └──parse error──▶ Failed ◀─┼───── store error ────┘
//!    ▲                                         │      │
//!    └─────────────────cancel──────────────────┴──────┘
//! ```
//!
//! Every store call returns its error to the caller; nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, ExportConfig};
use crate::error::{SheetError, SheetResult};
use crate::excel::{RecordExporter, SheetParser};
use crate::store::RecordStore;
use crate::types::{ColumnMapping, ParsedSheet, Record, StoredRecord};

/// Import dialog state
#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    Closed,
    AwaitingFile,
    Previewing(ParsedSheet),
    Submitting,
    /// Parsing or the store write failed; holds the error message
    Failed(String),
}

impl DialogState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::Closed => "closed",
            DialogState::AwaitingFile => "awaiting_file",
            DialogState::Previewing(_) => "previewing",
            DialogState::Submitting => "submitting",
            DialogState::Failed(_) => "failed",
        }
    }
}

/// A generated spreadsheet ready for download
#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub record_count: usize,
}

pub struct ImportController {
    store: Arc<dyn RecordStore>,
    parser: SheetParser,
    exporter: RecordExporter,
    mapping: ColumnMapping,
    export_file_name: String,
    state: DialogState,
    users: Vec<StoredRecord>,
}

impl ImportController {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_settings(store, ColumnMapping::default(), &ExportConfig::default())
    }

    pub fn from_config(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        Self::with_settings(store, config.columns, &config.export)
    }

    /// Export writes fields back to the same columns they are imported from
    pub fn with_settings(
        store: Arc<dyn RecordStore>,
        mapping: ColumnMapping,
        export: &ExportConfig,
    ) -> Self {
        Self {
            store,
            parser: SheetParser::new(),
            exporter: RecordExporter::new(mapping).with_header(export.header_row),
            mapping,
            export_file_name: export.file_name.clone(),
            state: DialogState::Closed,
            users: Vec::new(),
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// Parsed sheet currently shown in the dialog, if any
    pub fn preview(&self) -> Option<&ParsedSheet> {
        match &self.state {
            DialogState::Previewing(sheet) => Some(sheet),
            _ => None,
        }
    }

    /// Record list as of the last fetch
    pub fn users(&self) -> &[StoredRecord] {
        &self.users
    }

    pub fn mapping(&self) -> ColumnMapping {
        self.mapping
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    fn reject(&self, action: &'static str) -> SheetError {
        SheetError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Open the import dialog. Always starts with an empty preview.
    pub fn open(&mut self) -> SheetResult<()> {
        match self.state {
            DialogState::Closed | DialogState::Failed(_) | DialogState::AwaitingFile => {
                self.state = DialogState::AwaitingFile;
                Ok(())
            }
            _ => Err(self.reject("open")),
        }
    }

    /// Parse the chosen file and show it for confirmation
    pub fn select_file(&mut self, bytes: &[u8]) -> SheetResult<&ParsedSheet> {
        if self.state != DialogState::AwaitingFile {
            return Err(self.reject("select a file"));
        }

        let sheet = match self.parser.parse(bytes) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!("Failed to parse uploaded sheet: {}", e);
                self.state = DialogState::Failed(e.to_string());
                return Err(e);
            }
        };

        info!(
            columns = sheet.headers.len(),
            rows = sheet.rows.len(),
            "Previewing uploaded sheet"
        );
        self.state = DialogState::Previewing(sheet);
        self.preview().ok_or_else(|| self.reject("select a file"))
    }

    /// Close the dialog, discarding any parsed rows
    pub fn cancel(&mut self) -> SheetResult<()> {
        if self.state == DialogState::Submitting {
            return Err(self.reject("cancel"));
        }
        self.state = DialogState::Closed;
        Ok(())
    }

    /// Write every previewed row to the store in one batch, then refresh the list.
    ///
    /// Returns the number of records created. If the batch commits but the
    /// follow-up fetch fails, the dialog is closed and the fetch error is
    /// returned.
    pub async fn submit(&mut self) -> SheetResult<usize> {
        let records = self.start_submit()?;
        let outcome = self.store.batch_create(&records).await;
        let created = self.finish_submit(outcome)?;
        self.refresh().await?;
        Ok(created)
    }

    /// Move Previewing → Submitting and hand back the records to write.
    ///
    /// Lets a caller run the store write without holding the controller;
    /// pair with [`finish_submit`](Self::finish_submit).
    pub fn start_submit(&mut self) -> SheetResult<Vec<Record>> {
        match std::mem::replace(&mut self.state, DialogState::Submitting) {
            DialogState::Previewing(sheet) => Ok(sheet.to_records(&self.mapping)),
            other => {
                self.state = other;
                Err(self.reject("submit"))
            }
        }
    }

    /// Apply the outcome of the batch write started by `start_submit`
    pub fn finish_submit(&mut self, outcome: SheetResult<Vec<String>>) -> SheetResult<usize> {
        match outcome {
            Ok(ids) => {
                info!(count = ids.len(), backend = self.store.backend_name(), "Imported records");
                self.state = DialogState::Closed;
                Ok(ids.len())
            }
            Err(e) => {
                warn!("Import failed: {}", e);
                self.state = DialogState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Shared handle to the store, for calls made outside the controller
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Replace the record list with a fresh snapshot of the collection
    pub async fn refresh(&mut self) -> SheetResult<&[StoredRecord]> {
        let users = self.store.fetch_all().await.map_err(|e| {
            warn!("Failed to fetch records: {}", e);
            e
        })?;
        Ok(self.set_users(users))
    }

    /// Replace the record list with an already fetched snapshot
    pub fn set_users(&mut self, users: Vec<StoredRecord>) -> &[StoredRecord] {
        self.users = users;
        &self.users
    }

    /// Fetch the current records and render them to a spreadsheet
    pub async fn export(&mut self) -> SheetResult<ExportFile> {
        self.refresh().await?;
        self.render_export()
    }

    /// Render the record list as of the last fetch
    pub fn render_export(&self) -> SheetResult<ExportFile> {
        let records: Vec<_> = self.users.iter().map(|doc| doc.record.clone()).collect();
        let bytes = self.exporter.to_bytes(&records)?;

        info!(count = records.len(), file = %self.export_file_name, "Exported records");
        Ok(ExportFile {
            file_name: self.export_file_name.clone(),
            bytes,
            record_count: records.len(),
        })
    }
}
