//! Relationship detection
//!
//! Every reference candidate of a schema is resolved to a target collection:
//! first by probing other collections for the sampled identifiers, then by the
//! name heuristic.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::naming::{candidate_collection, resolve_known};
use crate::inference::reference_value;
use crate::models::{
    CollectionSchema, Confidence, FieldDescriptor, RelationshipEdge, dedup_edges,
};
use crate::sampler::{DEFAULT_OPERATION_TIMEOUT, timed};
use crate::storage::{Document, DocumentStore, StoreError};

/// Default number of concurrent existence probes
pub const DEFAULT_PROBE_CONCURRENCY: usize = 2;

/// Relationship detector settings
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Confirm targets by probing the store
    pub existence_check: bool,
    /// Permits of the probe semaphore
    pub probe_concurrency: usize,
    /// Timeout of each probe
    pub operation_timeout: Duration,
    /// Drop heuristic targets that are not known collections
    pub require_known_target: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            existence_check: true,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            require_known_target: false,
        }
    }
}

/// Proposes relationship edges for aggregated schemas
///
/// One detector is shared by all collections of a run so the probe semaphore
/// bounds the whole run.
#[derive(Clone)]
pub struct RelationshipDetector {
    store: Option<Arc<dyn DocumentStore>>,
    config: DetectorConfig,
    probes: Arc<Semaphore>,
}

impl RelationshipDetector {
    /// Create a detector that only applies the name heuristic
    pub fn heuristic(config: DetectorConfig) -> Self {
        Self::build(None, config)
    }

    /// Create a detector that confirms targets against `store` when possible
    pub fn with_store(store: Arc<dyn DocumentStore>, config: DetectorConfig) -> Self {
        Self::build(Some(store), config)
    }

    fn build(store: Option<Arc<dyn DocumentStore>>, config: DetectorConfig) -> Self {
        let permits = config.probe_concurrency.max(1);
        Self {
            store,
            config,
            probes: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Store to probe, if confirmation is enabled and supported
    fn probe_store(&self) -> Option<&Arc<dyn DocumentStore>> {
        if !self.config.existence_check {
            return None;
        }
        self.store.as_ref().filter(|store| store.supports_exists())
    }

    /// Propose edges for every reference candidate of `schema`
    ///
    /// `samples` are the documents the schema was aggregated from, `known` the
    /// collection listing in store order. Only connection failures abort
    /// detection; other probe failures fall back to the heuristic.
    pub async fn detect(
        &self,
        schema: &CollectionSchema,
        samples: &[Document],
        known: &[String],
    ) -> Result<Vec<RelationshipEdge>, StoreError> {
        let mut edges = Vec::new();

        for field in schema.reference_candidates() {
            let confirmed = match self.probe_store() {
                Some(store) => self.confirm(store, &schema.name, field, samples, known).await?,
                None => None,
            };

            let edge = match confirmed {
                Some(target) => Some(RelationshipEdge::new(
                    &schema.name,
                    target,
                    &field.path,
                    Confidence::ExistenceConfirmed,
                )),
                None => self.heuristic_target(&field.path, known).map(|target| {
                    RelationshipEdge::new(&schema.name, target, &field.path, Confidence::NameHeuristic)
                }),
            };

            match edge {
                Some(edge) => {
                    debug!(
                        from = %edge.from_collection,
                        to = %edge.to_collection,
                        via = %edge.via_field,
                        confidence = ?edge.confidence,
                        "Detected relationship"
                    );
                    edges.push(edge);
                }
                None => debug!(collection = %schema.name, field = %field.path, "No relationship target"),
            }
        }

        Ok(dedup_edges(edges))
    }

    /// Target proposed by the name heuristic
    pub fn heuristic_target(&self, field_path: &str, known: &[String]) -> Option<String> {
        let candidate = candidate_collection(field_path)?;
        match resolve_known(&candidate, known) {
            Some(name) => Some(name.to_string()),
            None if self.config.require_known_target => None,
            None => Some(candidate),
        }
    }

    /// Probe other collections for the field's sampled identifiers
    ///
    /// Values are tried in sample order; for each value the first collection in
    /// listing order holding it wins.
    async fn confirm(
        &self,
        store: &Arc<dyn DocumentStore>,
        from: &str,
        field: &FieldDescriptor,
        samples: &[Document],
        known: &[String],
    ) -> Result<Option<String>, StoreError> {
        let targets: Vec<String> = known.iter().filter(|c| *c != from).cloned().collect();
        if targets.is_empty() {
            return Ok(None);
        }

        for value in sampled_reference_values(samples, &field.path) {
            let mut probes = JoinSet::new();
            for (idx, target) in targets.iter().enumerate() {
                let store = Arc::clone(store);
                let permits = Arc::clone(&self.probes);
                let target = target.clone();
                let value = value.clone();
                let limit = self.config.operation_timeout;
                probes.spawn(async move {
                    let _permit = permits.acquire_owned().await.map_err(|_| {
                        StoreError::BackendError("probe semaphore closed".to_string())
                    })?;
                    let hit = timed("exists", &target, limit, store.exists(&target, &value)).await;
                    Ok::<_, StoreError>((idx, hit))
                });
            }

            let mut hits = vec![false; targets.len()];
            while let Some(joined) = probes.join_next().await {
                let (idx, hit) = joined
                    .map_err(|e| StoreError::BackendError(format!("Probe task failed: {}", e)))??;
                match hit {
                    Ok(found) => hits[idx] = found,
                    Err(err @ StoreError::Connection(_)) => return Err(err),
                    Err(err) => warn!(
                        collection = %targets[idx],
                        field = %field.path,
                        error = %err,
                        "Existence probe failed"
                    ),
                }
            }

            if let Some(idx) = hits.iter().position(|hit| *hit) {
                return Ok(Some(targets[idx].clone()));
            }
        }

        Ok(None)
    }
}

impl std::fmt::Debug for RelationshipDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipDetector")
            .field("has_store", &self.store.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Value stored at a dotted path; arrays along the way contribute their first element
fn value_at_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| match current {
        Value::Array(items) => items.first()?.get(segment),
        other => other.get(segment),
    })
}

/// Distinct resolvable identifiers of `path`, in sample order
fn sampled_reference_values(samples: &[Document], path: &str) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();
    for doc in samples {
        if let Some(id) = value_at_path(doc, path).and_then(reference_value)
            && !values.contains(id)
        {
            values.push(id.clone());
        }
    }
    values
}
