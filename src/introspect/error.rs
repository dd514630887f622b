//! Error types for introspection runs
//!
//! Errors chain their sources for debugging while offering user-friendly
//! messages for CLI output.

use thiserror::Error;

use crate::inference::InferenceError;
use crate::storage::{ResourceKind, StoreError};

/// Errors that can occur during an introspection run
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// Store error that aborts the run regardless of failure policy
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A single collection failed
    #[error("Collection '{collection}' failed: {source}")]
    Collection {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A worker task panicked or was aborted unexpectedly
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Run cancelled
    #[error("Introspection cancelled")]
    Cancelled,
}

/// Result type for introspection runs
pub type IntrospectResult<T> = Result<T, IntrospectError>;

impl IntrospectError {
    /// Create a collection failure with underlying error
    pub fn collection<E>(collection: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Collection {
            collection: collection.into(),
            source: Box::new(source),
        }
    }

    /// Classify a store error raised while working on `collection`
    ///
    /// Connection and not-found errors abort the run; everything else is a
    /// failure of that collection alone.
    pub fn from_collection_store_error(collection: &str, err: StoreError) -> Self {
        match err {
            StoreError::Connection(_) | StoreError::NotFound { .. } => Self::Store(err),
            other => Self::collection(collection, other),
        }
    }

    /// Classify an inference error raised while working on `collection`
    pub fn from_collection_inference_error(collection: &str, err: InferenceError) -> Self {
        Self::collection(collection, err)
    }

    /// Whether the failure policy may skip this error
    pub fn is_collection_failure(&self) -> bool {
        matches!(self, IntrospectError::Collection { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, IntrospectError::Cancelled)
    }

    /// Get the collection name if this is a collection failure
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            IntrospectError::Collection { collection, .. } => Some(collection),
            _ => None,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            IntrospectError::Store(StoreError::Connection(msg)) => {
                format!(
                    "Could not connect to the database: {msg}\n\nHint: Check that the source is reachable."
                )
            }
            IntrospectError::Store(StoreError::NotFound {
                kind: ResourceKind::Database,
                name,
            }) => {
                format!("Database not found: {name}\n\nHint: Check the --source and --database values.")
            }
            IntrospectError::Store(StoreError::NotFound {
                kind: ResourceKind::Collection,
                name,
            }) => {
                format!(
                    "Collection not found: {name}\n\nHint: Check the --include list against the database."
                )
            }
            IntrospectError::Store(StoreError::Timeout { .. }) => {
                format!("{self}\n\nHint: Increase operationTimeoutMs in your configuration.")
            }
            IntrospectError::Collection { collection, source } => {
                format!(
                    "Collection '{collection}' failed: {source}\n\nHint: Use --partial to skip failing collections."
                )
            }
            IntrospectError::Cancelled => "Introspection cancelled by user.".to_string(),
            _ => self.to_string(),
        }
    }
}
