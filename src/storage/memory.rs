//! In-memory document store
//!
//! Holds ordered collections of documents. Clones share state, so a store
//! handed out by [`Connector::connect`] reports probes and closing back to the
//! original instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{Connector, Document, DocumentStore, StoreError};

#[derive(Debug, Default)]
struct Counters {
    samples: AtomicUsize,
    probes: AtomicUsize,
    samples_in_flight: AtomicUsize,
    probes_in_flight: AtomicUsize,
    peak_samples: AtomicUsize,
    peak_probes: AtomicUsize,
    closed: AtomicBool,
}

/// Marks one running operation; records the peak on entry
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory document store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    database: String,
    collections: Vec<(String, Vec<Document>)>,
    latency: Option<Duration>,
    failures: HashMap<String, StoreError>,
    connection_error: Option<String>,
    exists_enabled: bool,
    counters: Arc<Counters>,
}

impl MemoryStore {
    /// Create an empty store for `database`
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collections: Vec::new(),
            latency: None,
            failures: HashMap::new(),
            connection_error: None,
            exists_enabled: true,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Add a collection; listing order follows insertion order
    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        let name = name.into();
        match self.collections.iter_mut().find(|(n, _)| *n == name) {
            Some((_, docs)) => *docs = documents,
            None => self.collections.push((name, documents)),
        }
        self
    }

    /// Delay every sample and existence probe
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make sampling `collection` fail with `error`
    pub fn with_failure(mut self, collection: impl Into<String>, error: StoreError) -> Self {
        self.failures.insert(collection.into(), error);
        self
    }

    /// Make connecting and listing fail
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.connection_error = Some(message.into());
        self
    }

    /// Disable the existence capability
    pub fn without_exists(mut self) -> Self {
        self.exists_enabled = false;
        self
    }

    /// Number of sample calls served
    pub fn sample_count(&self) -> usize {
        self.counters.samples.load(Ordering::SeqCst)
    }

    /// Number of existence probes served
    pub fn probe_count(&self) -> usize {
        self.counters.probes.load(Ordering::SeqCst)
    }

    /// Most sample calls ever running at once
    pub fn peak_concurrent_samples(&self) -> usize {
        self.counters.peak_samples.load(Ordering::SeqCst)
    }

    /// Most existence probes ever running at once
    pub fn peak_concurrent_probes(&self) -> usize {
        self.counters.peak_probes.load(Ordering::SeqCst)
    }

    /// Whether any handle of this store was closed
    pub fn is_closed(&self) -> bool {
        self.counters.closed.load(Ordering::SeqCst)
    }

    fn documents(&self, collection: &str) -> Result<&[Document], StoreError> {
        self.collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs.as_slice())
            .ok_or_else(|| StoreError::collection_not_found(collection))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database(&self) -> Option<&str> {
        Some(&self.database)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        if let Some(ref message) = self.connection_error {
            return Err(StoreError::Connection(message.clone()));
        }
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        self.counters.samples.fetch_add(1, Ordering::SeqCst);
        let _running = InFlight::enter(
            &self.counters.samples_in_flight,
            &self.counters.peak_samples,
        );
        self.simulate_latency().await;
        if let Some(error) = self.failures.get(collection) {
            return Err(error.clone());
        }
        let docs = self.documents(collection)?;
        Ok(docs.iter().take(limit).cloned().collect())
    }

    fn supports_exists(&self) -> bool {
        self.exists_enabled
    }

    async fn exists(&self, collection: &str, id: &Value) -> Result<bool, StoreError> {
        if !self.exists_enabled {
            return Err(StoreError::Unsupported(format!("exists on '{}'", collection)));
        }
        self.counters.probes.fetch_add(1, Ordering::SeqCst);
        let _running = InFlight::enter(
            &self.counters.probes_in_flight,
            &self.counters.peak_probes,
        );
        self.simulate_latency().await;
        let docs = self.documents(collection)?;
        Ok(docs.iter().any(|doc| doc.get("_id") == Some(id)))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.counters.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Connector for MemoryStore {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        if let Some(ref message) = self.connection_error {
            return Err(StoreError::Connection(message.clone()));
        }
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new("blog")
            .with_collection(
                "users",
                vec![
                    json!({"_id": {"$oid": "507f1f77bcf86cd799439011"}, "name": "Alice"}),
                    json!({"_id": {"$oid": "507f1f77bcf86cd799439012"}, "name": "Bob"}),
                ],
            )
            .with_collection("empty", Vec::new())
    }

    #[test]
    fn test_list_in_insertion_order() {
        runtime().block_on(async {
            let names = store().list_collections().await.unwrap();
            assert_eq!(names, vec!["users", "empty"]);
        });
    }

    #[test]
    fn test_sample_limit_and_empty() {
        runtime().block_on(async {
            let store = store();
            assert_eq!(store.sample("users", 1).await.unwrap().len(), 1);
            assert!(store.sample("empty", 10).await.unwrap().is_empty());
            assert_eq!(store.sample_count(), 2);
        });
    }

    #[test]
    fn test_sample_missing_collection() {
        runtime().block_on(async {
            let err = store().sample("nope", 10).await.unwrap_err();
            assert_eq!(err, StoreError::collection_not_found("nope"));
        });
    }

    #[test]
    fn test_exists_by_id() {
        runtime().block_on(async {
            let store = store();
            let hit = json!({"$oid": "507f1f77bcf86cd799439012"});
            let miss = json!({"$oid": "000000000000000000000000"});
            assert!(store.exists("users", &hit).await.unwrap());
            assert!(!store.exists("users", &miss).await.unwrap());
            assert_eq!(store.probe_count(), 2);
        });
    }

    #[test]
    fn test_peak_concurrency_tracking() {
        runtime().block_on(async {
            let store = store().with_latency(std::time::Duration::from_millis(5));
            let (a, b) = tokio::join!(store.sample("users", 1), store.sample("empty", 1));
            a.unwrap();
            b.unwrap();
            assert_eq!(store.peak_concurrent_samples(), 2);
            assert_eq!(store.peak_concurrent_probes(), 0);

            store.sample("users", 1).await.unwrap();
            assert_eq!(store.peak_concurrent_samples(), 2);
        });
    }

    #[test]
    fn test_connect_shares_state() {
        runtime().block_on(async {
            let store = store();
            let handle = store.connect().await.unwrap();
            handle.close().await.unwrap();
            assert!(store.is_closed());
        });
    }

    #[test]
    fn test_unreachable() {
        runtime().block_on(async {
            let store = store().unreachable("refused");
            assert!(matches!(store.connect().await, Err(StoreError::Connection(_))));
        });
    }
}
