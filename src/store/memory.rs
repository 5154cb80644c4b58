//! In-process record store

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::{auto_id, RecordStore};
use crate::error::SheetResult;
use crate::types::{Record, StoredRecord};

/// Collection kept in memory for the lifetime of the process.
///
/// Same contract as the hosted store: insertion order on fetch, batches
/// applied as a whole under one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection, assigning fresh ids
    pub fn with_records(records: Vec<Record>) -> Self {
        let documents = records
            .into_iter()
            .map(|record| StoredRecord {
                id: auto_id(),
                record,
            })
            .collect();
        Self {
            documents: Mutex::new(documents),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredRecord>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self) -> SheetResult<Vec<StoredRecord>> {
        Ok(self.lock().clone())
    }

    async fn batch_create(&self, records: &[Record]) -> SheetResult<Vec<String>> {
        let created: Vec<StoredRecord> = records
            .iter()
            .map(|record| StoredRecord {
                id: auto_id(),
                record: record.clone(),
            })
            .collect();
        let ids = created.iter().map(|doc| doc.id.clone()).collect();

        self.lock().extend(created);
        debug!(count = records.len(), "Committed batch to memory store");
        Ok(ids)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    #[tokio::test]
    async fn test_batch_create_then_fetch() {
        let store = MemoryStore::new();
        let ids = store
            .batch_create(&[Record::new("Ann", 30.0), Record::new("Bo", 41.0)])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let docs = store.fetch_all().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, ids[0]);
        assert_eq!(docs[0].record, Record::new("Ann", 30.0));
        assert_eq!(docs[1].record, Record::new("Bo", 41.0));
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let store = MemoryStore::new();
        let ids = store.batch_create(&[]).await.unwrap();
        assert!(ids.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_with_records_seeds_collection() {
        let store = MemoryStore::with_records(vec![Record::new("Cy", 7.0)]);
        assert_eq!(store.len(), 1);
        let docs = store.fetch_all().await.unwrap();
        assert_eq!(docs[0].record.name, CellValue::from("Cy"));
    }
}
