//! Bounded, timed document sampling

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::storage::{Document, DocumentStore, StoreError};

/// Default number of documents sampled per collection
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Default timeout for a single store operation
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a store operation under `limit`, mapping expiry to [`StoreError::Timeout`]
pub async fn timed<T, F>(
    operation: &str,
    target: &str,
    limit: Duration,
    fut: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                target,
                timeout_ms = limit.as_millis() as u64,
                "Store operation timed out"
            );
            Err(StoreError::Timeout {
                operation: operation.to_string(),
                target: target.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })
        }
    }
}

/// Fetches bounded document samples from a store
#[derive(Clone)]
pub struct Sampler {
    store: Arc<dyn DocumentStore>,
    sample_size: usize,
    timeout: Duration,
}

impl Sampler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            sample_size: DEFAULT_SAMPLE_SIZE,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sample up to `sample_size` documents in the store's cursor order
    ///
    /// No sort is imposed. Missing collections and connection failures
    /// propagate unchanged.
    pub async fn sample(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut documents = timed(
            "sample",
            collection,
            self.timeout,
            self.store.sample(collection, self.sample_size),
        )
        .await?;

        if documents.len() > self.sample_size {
            documents.truncate(self.sample_size);
        }

        debug!(collection, documents = documents.len(), "Sampled collection");
        Ok(documents)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("database", &self.store.database())
            .field("sample_size", &self.sample_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
