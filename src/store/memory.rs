//! In-memory document store

use super::{CollectionPath, DocumentStore, FieldFilter, StoreError, StoredDocument};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Document store backed by a map of collections
///
/// Supports artificial latency keyed by filter value and failure injection,
/// which makes fetch ordering and error paths reproducible.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
    delays: HashMap<String, Duration>,
    failure: Option<String>,
    query_calls: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document; `data` must be a JSON object
    pub fn with_document(mut self, collection: &str, id: &str, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        self.collections
            .get_mut()
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument::new(id, data));
        self
    }

    /// Delay queries whose filter value is `value` (use "" for unfiltered)
    pub fn with_delay(mut self, value: &str, delay: Duration) -> Self {
        self.delays.insert(value.to_string(), delay);
        self
    }

    /// Make every query fail with the given message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Number of queries issued so far
    pub fn query_calls(&self) -> u64 {
        self.query_calls.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);

        let key = filter.map(|f| f.value.as_str()).unwrap_or("");
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(ref message) = self.failure {
            return Err(StoreError::Unavailable(message.clone()));
        }

        let collections = self.collections.lock().await;
        let documents = collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(documents)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
