//! Document store abstraction
//!
//! Defines the DocumentStore trait and implementations for different sources:
//! - MemoryStore: in-process collections (embedding, tests)
//! - DirectoryStore: a directory of Extended JSON exports (native apps, CLI)

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// A sampled document, MongoDB Extended JSON with an object at the root
pub type Document = Value;

/// What a [`StoreError::NotFound`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Database,
    Collection,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Database => write!(f, "Database"),
            ResourceKind::Collection => write!(f, "Collection"),
        }
    }
}

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },
    #[error("Invalid collection name: {0}")]
    InvalidName(String),
    #[error("Operation '{operation}' on '{target}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: String,
        target: String,
        timeout_ms: u64,
    },
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Operation not supported by this store: {0}")]
    Unsupported(String),
    #[error("Store backend error: {0}")]
    BackendError(String),
}

impl StoreError {
    pub fn database_not_found(name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: ResourceKind::Database,
            name: name.into(),
        }
    }

    pub fn collection_not_found(name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind: ResourceKind::Collection,
            name: name.into(),
        }
    }

    /// Whether the error names a missing database or collection
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Trait for document stores
///
/// A store is an open handle to one database. Implementations must be cheap
/// to share behind an `Arc`; the introspector calls them from several tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database this handle is bound to
    fn database(&self) -> Option<&str> {
        None
    }

    /// List collection names in the store's default order
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    /// Fetch up to `limit` documents in the store's default cursor order
    ///
    /// An empty collection yields an empty vector.
    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError>;

    /// Whether `exists` is implemented
    fn supports_exists(&self) -> bool {
        false
    }

    /// Check whether `collection` holds a document whose `_id` equals `id`
    async fn exists(&self, collection: &str, _id: &Value) -> Result<bool, StoreError> {
        Err(StoreError::Unsupported(format!("exists on '{}'", collection)))
    }

    /// Release the handle
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Opens store handles
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError>;
}

/// Whether `name` is usable as a collection name
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

pub mod memory;

#[cfg(feature = "native-fs")]
pub mod filesystem;

pub use memory::MemoryStore;

#[cfg(feature = "native-fs")]
pub use filesystem::DirectoryStore;
