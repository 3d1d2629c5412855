//! In-memory document store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

use crate::store::{DocumentStore, StoreError, StoreResult};

/// A thread-safe document store keyed by `(collection, id)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<(String, String), serde_json::Value>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a JSON file shaped as
    /// `{ "<collection>": { "<id>": { ...document... } } }`.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            documents = store.len(),
            "Loaded credential store seed"
        );
        Ok(store)
    }

    /// Seed a store from JSON text (same shape as [`MemoryStore::load_from_file`]).
    pub fn from_json(content: &str) -> StoreResult<Self> {
        let root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| StoreError::Backend(format!("invalid store seed: {}", e)))?;

        let store = Self::new();
        for (collection, docs) in root {
            let serde_json::Value::Object(docs) = docs else {
                return Err(StoreError::Backend(format!(
                    "collection '{}' must be an object",
                    collection
                )));
            };
            for (id, doc) in docs {
                store.insert(&collection, &id, doc);
            }
        }
        Ok(store)
    }

    /// Insert or replace a document.
    pub fn insert(&self, collection: &str, id: &str, doc: serde_json::Value) {
        self.inner
            .insert((collection.to_string(), id.to_string()), doc);
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_doc(&self, collection: &str, id: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self
            .inner
            .get(&(collection.to_string(), id.to_string()))
            .map(|r| r.value().clone()))
    }
}
