//! Record store clients
//!
//! The controller talks to a [`RecordStore`]: fetch every record in the
//! collection, or create a batch of records in one atomic write.

mod firestore;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::SheetResult;
use crate::types::{Record, StoredRecord};

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Length of store-assigned document ids
pub const AUTO_ID_LEN: usize = 20;

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A document collection holding `{name, age}` records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Snapshot of the whole collection at call time, in store order
    async fn fetch_all(&self) -> SheetResult<Vec<StoredRecord>>;

    /// Create all records in one atomic write; returns their new ids in input order
    async fn batch_create(&self, records: &[Record]) -> SheetResult<Vec<String>>;

    /// Short label for logs and the API's version info
    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by the configuration
pub fn build_store(config: &StoreConfig) -> SheetResult<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Firestore => Ok(Arc::new(FirestoreStore::new(config)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Random 20-character alphanumeric document id
pub fn auto_id() -> String {
    let mut entropy = Vec::with_capacity(32);
    entropy.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    entropy.extend_from_slice(uuid::Uuid::new_v4().as_bytes());

    entropy
        .iter()
        .take(AUTO_ID_LEN)
        .map(|b| AUTO_ID_ALPHABET[*b as usize % AUTO_ID_ALPHABET.len()] as char)
        .collect()
}
