//! Credential and configuration store.
//!
//! # Data Flow
//! ```text
//! Pipeline / auth guard
//!     → DocumentStore::find_doc(collection, id)
//!     → records.rs (typed views: SenderEntity, RecipientConfig, AuthConfig)
//! ```
//!
//! # Design Decisions
//! - The store is a lookup capability; the relay never writes to it
//! - Absent documents are `Ok(None)`, not errors
//! - Typed records are decoded at the call site so each caller decides
//!   whether a malformed document is "absent" or a failure

pub mod memory;
pub mod records;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use records::{AuthConfig, RecipientConfig, SenderEntity};

/// Errors raised by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or read.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A document exists but does not have the expected shape.
    #[error("malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Lookup of documents by collection and opaque key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` when it does not exist.
    async fn find_doc(&self, collection: &str, id: &str) -> StoreResult<Option<serde_json::Value>>;
}

/// Fetch a document and decode it into a typed record.
pub async fn find_record<T>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> StoreResult<Option<T>>
where
    T: serde::de::DeserializeOwned,
{
    match store.find_doc(collection, id).await? {
        Some(doc) => serde_json::from_value(doc)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                collection: collection.to_string(),
                id: id.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}
