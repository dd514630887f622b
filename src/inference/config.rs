//! Configuration for type inference

use serde::{Deserialize, Serialize};

/// Default nesting bound for the inferencer
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for type inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    /// Maximum nesting depth for objects and arrays
    ///
    /// Containers met at this depth are recorded as truncated instead of
    /// being descended into.
    pub max_depth: usize,

    /// Classify ISO-8601 date and date-time strings as `Date`
    pub detect_formats: bool,

    /// Classify 24-hex-digit strings as `Reference`
    ///
    /// Useful for stores that export identifiers as plain strings.
    pub string_ids_as_references: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_formats: true,
            string_ids_as_references: false,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the maximum nesting depth (at least 1)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth.max(1);
        self
    }

    /// Enable or disable date format detection
    pub fn detect_formats(mut self, detect: bool) -> Self {
        self.config.detect_formats = detect;
        self
    }

    /// Enable or disable treating hex identifier strings as references
    pub fn string_ids_as_references(mut self, enabled: bool) -> Self {
        self.config.string_ids_as_references = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
