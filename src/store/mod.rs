//! Document store access
//!
//! This module defines the read-only seam to the hosted document database:
//! - [`DocumentStore`], the query trait the catalog depends on
//! - [`FirestoreStore`], the REST implementation
//! - [`MemoryStore`], an in-memory implementation for tests and demos

mod firestore;
mod memory;

pub use firestore::{FirestoreConfig, FirestoreStore, DEFAULT_ENDPOINT};
pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;

/// Failure while reading from the document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store request failed: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Store query failed: {code} - {message}")]
    Query { code: i32, message: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),

    #[error("Invalid collection path: {0}")]
    InvalidPath(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A raw document: the store-assigned id plus its key-value data
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Map<String, Value>,
}

impl StoredDocument {
    pub fn new(id: &str, data: Map<String, Value>) -> Self {
        Self {
            id: id.to_string(),
            data,
        }
    }

    /// String value of a top-level field, if present
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

/// Equality filter on a single top-level string field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn equals(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Check a document against the filter
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        doc.field_str(&self.field) == Some(self.value.as_str())
    }
}

/// A slash-separated collection path such as `companies/{id}/things`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Parse a collection path; it must have an odd number of non-empty segments
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) || segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent document path (empty for a root collection) and collection id
    pub fn split(&self) -> (&str, &str) {
        match self.0.rsplit_once('/') {
            Some((parent, id)) => (parent, id),
            None => ("", &self.0),
        }
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only query access to a document database
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return every document in `collection`, optionally narrowed by an
    /// equality filter evaluated by the store
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: Option<&FieldFilter>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Short name for logging
    fn backend_name(&self) -> &'static str;
}
