//! Logging setup for the CLI
//!
//! Logs go to stderr so diagrams written to stdout stay clean.

use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::CliError;

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Either a simple level like "info" or a full EnvFilter string
    /// e.g. "warn,mongodb_erd=debug". `RUST_LOG` takes precedence.
    pub level: Option<String>,
    /// Emit logs as JSON lines when true; otherwise text.
    pub json: bool,
    /// Include targets in log lines.
    pub with_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Some("warn".to_owned()),
            json: false,
            with_targets: false,
        }
    }
}

/// Install the global subscriber
pub fn init(cfg: &LogConfig) -> Result<(), CliError> {
    let level = cfg.level.clone().unwrap_or_else(|| "warn".into());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = if cfg.json {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.with_targets)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.with_targets)
            .boxed()
    };

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
