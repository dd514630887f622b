//! Introspection run configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::inference::InferenceConfig;
use crate::relationships::{DEFAULT_PROBE_CONCURRENCY, DetectorConfig};
use crate::sampler::{DEFAULT_OPERATION_TIMEOUT, DEFAULT_SAMPLE_SIZE};

/// Default number of collections sampled concurrently
pub const DEFAULT_SAMPLING_CONCURRENCY: usize = 4;

/// What to do when a single collection cannot be introspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run on the first failing collection
    #[default]
    FailFast,
    /// Skip failing collections and report them alongside the results
    Partial,
}

/// Introspection run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntrospectConfig {
    /// Documents sampled per collection
    pub sample_size: usize,
    /// Collections sampled at the same time
    pub sampling_concurrency: usize,
    /// Existence probes in flight at the same time
    pub probe_concurrency: usize,
    /// Timeout of every store operation, in milliseconds
    pub operation_timeout_ms: u64,
    /// Confirm relationship targets by probing the store
    pub existence_check: bool,
    /// Drop name-heuristic targets that are not known collections
    pub require_known_target: bool,
    /// Collections to introspect, in this order (empty = all listed)
    pub include: Vec<String>,
    /// Collections to skip
    pub exclude: Vec<String>,
    pub failure_policy: FailurePolicy,
    pub inference: InferenceConfig,
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            sampling_concurrency: DEFAULT_SAMPLING_CONCURRENCY,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT.as_millis() as u64,
            existence_check: true,
            require_known_target: false,
            include: Vec::new(),
            exclude: Vec::new(),
            failure_policy: FailurePolicy::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl IntrospectConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of documents sampled per collection (at least 1)
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Set the sampling concurrency (at least 1)
    pub fn with_sampling_concurrency(mut self, permits: usize) -> Self {
        self.sampling_concurrency = permits.max(1);
        self
    }

    /// Set the probe concurrency (at least 1)
    pub fn with_probe_concurrency(mut self, permits: usize) -> Self {
        self.probe_concurrency = permits.max(1);
        self
    }

    /// Set the store operation timeout
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable or disable existence confirmation
    pub fn with_existence_check(mut self, enabled: bool) -> Self {
        self.existence_check = enabled;
        self
    }

    /// Require heuristic targets to be known collections
    pub fn with_require_known_target(mut self, enabled: bool) -> Self {
        self.require_known_target = enabled;
        self
    }

    /// Restrict the run to these collections
    pub fn with_include<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = collections.into_iter().map(Into::into).collect();
        self
    }

    /// Skip these collections
    pub fn with_exclude<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = collections.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Raise zero counts, depth, and timeout to their minimum of 1
    ///
    /// Builders clamp on their own; this covers values that arrive through
    /// deserialization.
    pub fn normalized(mut self) -> Self {
        self.sample_size = self.sample_size.max(1);
        self.sampling_concurrency = self.sampling_concurrency.max(1);
        self.probe_concurrency = self.probe_concurrency.max(1);
        self.operation_timeout_ms = self.operation_timeout_ms.max(1);
        self.inference.max_depth = self.inference.max_depth.max(1);
        self
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Settings for the relationship detector
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            existence_check: self.existence_check,
            probe_concurrency: self.probe_concurrency.max(1),
            operation_timeout: self.operation_timeout(),
            require_known_target: self.require_known_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IntrospectConfig::default();
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.sampling_concurrency, 4);
        assert_eq!(config.probe_concurrency, 2);
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));
        assert!(config.existence_check);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_builder_clamps() {
        let config = IntrospectConfig::new()
            .with_sample_size(0)
            .with_sampling_concurrency(0)
            .with_probe_concurrency(0);
        assert_eq!(config.sample_size, 1);
        assert_eq!(config.sampling_concurrency, 1);
        assert_eq!(config.probe_concurrency, 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: IntrospectConfig =
            serde_json::from_str(r#"{"sampleSize": 25, "failurePolicy": "partial"}"#).unwrap();
        assert_eq!(config.sample_size, 25);
        assert_eq!(config.failure_policy, FailurePolicy::Partial);
        assert_eq!(config.sampling_concurrency, DEFAULT_SAMPLING_CONCURRENCY);
    }

    #[test]
    fn test_normalized_raises_deserialized_zeros() {
        let config: IntrospectConfig = serde_json::from_str(
            r#"{"sampleSize": 0, "samplingConcurrency": 0, "probeConcurrency": 0,
                "operationTimeoutMs": 0, "inference": {"maxDepth": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.sample_size, 0);

        let config = config.normalized();
        assert_eq!(config.sample_size, 1);
        assert_eq!(config.sampling_concurrency, 1);
        assert_eq!(config.probe_concurrency, 1);
        assert_eq!(config.operation_timeout(), Duration::from_millis(1));
        assert_eq!(config.inference.max_depth, 1);
    }

    #[test]
    fn test_normalized_keeps_valid_values() {
        let config = IntrospectConfig::new().with_sample_size(25);
        assert_eq!(config.clone().normalized(), config);
    }
}
