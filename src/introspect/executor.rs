//! Introspection executor
//!
//! Orchestrates one run: list collections, sample and aggregate them with
//! bounded concurrency, then detect relationships over the aggregated
//! schemas. The run observes a cancellation token throughout.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::config::{FailurePolicy, IntrospectConfig};
use super::error::{IntrospectError, IntrospectResult};
use crate::inference::{TypeInferencer, aggregate};
use crate::models::{CollectionFailure, CollectionSchema, SchemaReport, dedup_edges};
use crate::relationships::RelationshipDetector;
use crate::sampler::{Sampler, timed};
use crate::storage::{Connector, Document, DocumentStore, StoreError};

/// Outcome of sampling one collection
type Sampled = (CollectionSchema, Vec<Document>);

/// Runs schema introspection against a document store
#[derive(Debug, Clone, Default)]
pub struct Introspector {
    config: IntrospectConfig,
}

impl Introspector {
    /// Create an introspector with custom configuration
    ///
    /// Zero counts in `config` are raised to 1.
    pub fn new(config: IntrospectConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &IntrospectConfig {
        &self.config
    }

    /// Connect, run, and close the handle on every exit path
    pub async fn run_scoped(
        &self,
        connector: &dyn Connector,
        cancel: CancellationToken,
    ) -> IntrospectResult<SchemaReport> {
        let connect = async {
            timed(
                "connect",
                "store",
                self.config.operation_timeout(),
                connector.connect(),
            )
            .await
            .map_err(IntrospectError::from)
        };
        let store = match with_cancel(&cancel, connect).await {
            Ok(store) => store,
            Err(IntrospectError::Cancelled) => {
                return self.cancelled(SchemaReport::default());
            }
            Err(e) => return Err(e),
        };

        let result = self.run(Arc::clone(&store), cancel).await;

        if let Err(e) = store.close().await {
            warn!(error = %e, "Failed to close store handle");
        }
        result
    }

    /// Run against an already open store
    ///
    /// The caller keeps ownership of the handle and is responsible for closing it.
    pub async fn run(
        &self,
        store: Arc<dyn DocumentStore>,
        cancel: CancellationToken,
    ) -> IntrospectResult<SchemaReport> {
        let run_id = Uuid::new_v4().to_string();
        let database = store.database().map(str::to_string);
        let span = info_span!(
            "introspect_run",
            run_id = %run_id,
            database = database.as_deref().unwrap_or("")
        );

        async move {
            let start = Instant::now();
            let mut report = SchemaReport {
                database: database.clone(),
                ..SchemaReport::default()
            };

            let target = database.as_deref().unwrap_or("store");
            let listing = with_cancel(&cancel, async {
                timed(
                    "list_collections",
                    target,
                    self.config.operation_timeout(),
                    store.list_collections(),
                )
                .await
                .map_err(IntrospectError::from)
            })
            .await;
            let listing = match listing {
                Ok(listing) => listing,
                Err(IntrospectError::Cancelled) => return self.cancelled(report),
                Err(e) => return Err(e),
            };

            let selected = self.select_collections(&listing)?;
            info!(
                listed = listing.len(),
                selected = selected.len(),
                sample_size = self.config.sample_size,
                "Starting introspection"
            );

            let (sampled, interrupted) = self
                .sample_collections(&store, &selected, &cancel, &mut report.failures)
                .await?;
            if interrupted {
                report.collections = sampled.into_iter().map(|(schema, _)| schema).collect();
                return self.cancelled(report);
            }

            let detector = if self.config.existence_check {
                RelationshipDetector::with_store(Arc::clone(&store), self.config.detector_config())
            } else {
                RelationshipDetector::heuristic(self.config.detector_config())
            };

            let mut edges = Vec::new();
            let mut interrupted = false;
            for (mut schema, samples) in sampled {
                if !interrupted {
                    let detected = with_cancel(&cancel, async {
                        detector
                            .detect(&schema, &samples, &listing)
                            .await
                            .map_err(IntrospectError::from)
                    })
                    .await;
                    match detected {
                        Ok(found) => {
                            edges.extend(found.iter().cloned());
                            schema.relationships = found;
                        }
                        Err(IntrospectError::Cancelled) => interrupted = true,
                        Err(e) => return Err(e),
                    }
                }
                report.collections.push(schema);
            }
            report.relationships = dedup_edges(edges);

            if interrupted {
                return self.cancelled(report);
            }

            info!(
                collections = report.collections.len(),
                relationships = report.relationships.len(),
                failures = report.failures.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Introspection completed"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Apply include and exclude lists to the listing
    ///
    /// Included names keep the include order; an included name missing from
    /// the listing is an error.
    fn select_collections(&self, listing: &[String]) -> IntrospectResult<Vec<String>> {
        let candidates: Vec<String> = if self.config.include.is_empty() {
            listing.to_vec()
        } else {
            let mut chosen = Vec::with_capacity(self.config.include.len());
            for name in &self.config.include {
                if !listing.contains(name) {
                    return Err(StoreError::collection_not_found(name.as_str()).into());
                }
                if !chosen.contains(name) {
                    chosen.push(name.clone());
                }
            }
            chosen
        };

        Ok(candidates
            .into_iter()
            .filter(|name| !self.config.exclude.contains(name))
            .collect())
    }

    /// Sample, infer, and aggregate every selected collection
    ///
    /// Results keep the order of `selected`. The flag is set when the run was
    /// cancelled under the partial policy.
    async fn sample_collections(
        &self,
        store: &Arc<dyn DocumentStore>,
        selected: &[String],
        cancel: &CancellationToken,
        failures: &mut Vec<CollectionFailure>,
    ) -> IntrospectResult<(Vec<Sampled>, bool)> {
        let sampler = Sampler::new(Arc::clone(store))
            .with_sample_size(self.config.sample_size)
            .with_timeout(self.config.operation_timeout());
        let inferencer = TypeInferencer::with_config(self.config.inference.clone());
        let permits = Arc::new(Semaphore::new(self.config.sampling_concurrency.max(1)));

        let mut tasks = JoinSet::new();
        for (idx, name) in selected.iter().enumerate() {
            let sampler = sampler.clone();
            let inferencer = inferencer.clone();
            let permits = Arc::clone(&permits);
            let name = name.clone();
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| IntrospectError::TaskFailed("sampling semaphore closed".into()))?;
                let result = introspect_collection(&sampler, &inferencer, &name).await;
                Ok::<_, IntrospectError>((idx, name, result))
            });
        }

        let mut slots: Vec<Option<Sampled>> = selected.iter().map(|_| None).collect();
        let mut interrupted = false;
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(pending = tasks.len(), "Introspection cancelled during sampling");
                    tasks.abort_all();
                    if self.config.failure_policy == FailurePolicy::FailFast {
                        return Err(IntrospectError::Cancelled);
                    }
                    interrupted = true;
                    break;
                }
                joined = tasks.join_next() => joined,
            };
            let Some(joined) = joined else { break };

            let (idx, name, result) =
                joined.map_err(|e| IntrospectError::TaskFailed(e.to_string()))??;
            match result {
                Ok(sampled) => slots[idx] = Some(sampled),
                Err(e)
                    if e.is_collection_failure()
                        && self.config.failure_policy == FailurePolicy::Partial =>
                {
                    warn!(collection = %name, error = %e, "Skipping collection");
                    failures.push(CollectionFailure {
                        collection: name,
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        // Failures arrive in completion order
        failures.sort_by_key(|f| selected.iter().position(|s| *s == f.collection));

        Ok((slots.into_iter().flatten().collect(), interrupted))
    }

    /// Outcome of a cancelled run under the configured policy
    fn cancelled(&self, mut report: SchemaReport) -> IntrospectResult<SchemaReport> {
        match self.config.failure_policy {
            FailurePolicy::FailFast => Err(IntrospectError::Cancelled),
            FailurePolicy::Partial => {
                report.cancelled = true;
                Ok(report)
            }
        }
    }
}

/// Sample one collection and aggregate its schema
async fn introspect_collection(
    sampler: &Sampler,
    inferencer: &TypeInferencer,
    name: &str,
) -> IntrospectResult<Sampled> {
    let samples = sampler
        .sample(name)
        .await
        .map_err(|e| IntrospectError::from_collection_store_error(name, e))?;

    let mut inferred = Vec::with_capacity(samples.len());
    for doc in &samples {
        let document = inferencer
            .infer_document(name, doc)
            .map_err(|e| IntrospectError::from_collection_inference_error(name, e))?;
        inferred.push(document);
    }

    let schema = aggregate(name, inferred);
    debug!(
        collection = name,
        documents = schema.document_count,
        fields = schema.fields.len(),
        "Collection introspected"
    );
    Ok((schema, samples))
}

/// Race `fut` against the cancellation token
async fn with_cancel<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = IntrospectResult<T>>,
) -> IntrospectResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(IntrospectError::Cancelled),
        result = fut => result,
    }
}
