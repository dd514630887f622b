//! Tool configuration
//!
//! Values are layered: defaults, then an optional TOML file, then environment
//! variables, then command-line flags (applied by the CLI).
//!
//! ```toml
//! [introspect]
//! sampleSize = 20
//! failurePolicy = "partial"
//!
//! [introspect.inference]
//! maxDepth = 16
//!
//! [output]
//! format = "mermaid"
//! theme = "dark"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::export::{OutputFormat, Theme};
use crate::introspect::IntrospectConfig;

/// Environment variable overriding the Mermaid theme
pub const ENV_THEME: &str = "MERMAID_THEME";
/// Environment variable overriding the output format
pub const ENV_FORMAT: &str = "OUTPUT_FORMAT";
/// Environment variable overriding the sample size
pub const ENV_SAMPLE_SIZE: &str = "ERD_SAMPLE_SIZE";

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Where and how the report is written
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub theme: Theme,
    /// Output file; `None` selects a timestamped default, `-` means stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Complete tool configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErdConfig {
    /// Run settings, including type inference
    pub introspect: IntrospectConfig,
    pub output: OutputConfig,
}

impl ErdConfig {
    /// Parse a TOML document
    ///
    /// A zero `operationTimeoutMs` is rejected; other zero counts are raised
    /// to 1.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validated()
    }

    /// Reject settings no run can use and clamp the rest
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.introspect.operation_timeout_ms == 0 {
            return Err(invalid(
                "operationTimeoutMs",
                "0",
                "timeout must be at least 1 millisecond".to_string(),
            ));
        }
        self.introspect = self.introspect.normalized();
        Ok(self)
    }

    /// Load a TOML configuration file
    #[cfg(feature = "config-file")]
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_THEME) {
            self.output.theme = value
                .parse()
                .map_err(|message| invalid(ENV_THEME, &value, message))?;
        }
        if let Some(value) = get(ENV_FORMAT) {
            self.output.format = value
                .parse()
                .map_err(|message| invalid(ENV_FORMAT, &value, message))?;
        }
        if let Some(value) = get(ENV_SAMPLE_SIZE) {
            let size: usize = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(ENV_SAMPLE_SIZE, &value, e.to_string()))?;
            self.introspect = std::mem::take(&mut self.introspect).with_sample_size(size);
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message,
    }
}
