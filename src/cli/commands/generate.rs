//! CLI command that generates a diagram from a document store

use std::path::PathBuf;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::CliError;
use crate::cli::output::OutputTarget;
use crate::config::ErdConfig;
use crate::export::{OutputFormat, Theme, export_report};
use crate::introspect::{FailurePolicy, Introspector};
use crate::models::SchemaReport;
use crate::storage::DirectoryStore;

/// Arguments for the `generate` command
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Directory holding database exports
    pub source: PathBuf,
    /// Database directory below `source`; `source` itself when absent
    pub database: Option<String>,
    /// Output file path (`-` for stdout)
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub theme: Option<Theme>,
    /// Collections to include, in order
    pub include: Vec<String>,
    /// Collections to exclude
    pub exclude: Vec<String>,
    pub sample_size: Option<usize>,
    pub no_existence_check: bool,
    /// Skip failing collections instead of aborting
    pub partial: bool,
    /// TOML configuration file
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Path of the database directory
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(name) => self.source.join(name),
            None => self.source.clone(),
        }
    }

    /// Layer file, environment, and flags into one configuration
    pub fn resolve_config(&self) -> Result<ErdConfig, CliError> {
        if self.sample_size == Some(0) {
            return Err(CliError::InvalidArgument(
                "--sample-size must be at least 1".to_string(),
            ));
        }
        let mut config = match &self.config {
            Some(path) => ErdConfig::load(path)?,
            None => ErdConfig::default(),
        };
        config.apply_env()?;
        self.apply_flags(&mut config);
        Ok(config)
    }

    fn apply_flags(&self, config: &mut ErdConfig) {
        let mut introspect = std::mem::take(&mut config.introspect);
        if let Some(size) = self.sample_size {
            introspect = introspect.with_sample_size(size);
        }
        if !self.include.is_empty() {
            introspect = introspect.with_include(self.include.iter().cloned());
        }
        if !self.exclude.is_empty() {
            introspect = introspect.with_exclude(self.exclude.iter().cloned());
        }
        if self.no_existence_check {
            introspect = introspect.with_existence_check(false);
        }
        if self.partial {
            introspect = introspect.with_failure_policy(FailurePolicy::Partial);
        }
        config.introspect = introspect;

        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(theme) = self.theme {
            config.output.theme = theme;
        }
        if let Some(ref output) = self.output {
            config.output.path = Some(output.clone());
        }
    }
}

/// Result of a successful `generate` run
#[derive(Debug)]
pub struct GenerateOutcome {
    pub report: SchemaReport,
    pub target: OutputTarget,
}

/// Handle the `generate` command
pub async fn handle_generate(
    args: &GenerateArgs,
    cancel: CancellationToken,
) -> Result<GenerateOutcome, CliError> {
    let config = args.resolve_config()?;
    let store = DirectoryStore::new(args.database_path());

    eprintln!("Introspecting {}...", args.database_path().display());
    eprintln!("  Sample size: {}", config.introspect.sample_size);
    eprintln!("  Existence check: {}", config.introspect.existence_check);

    let introspector = Introspector::new(config.introspect.clone());
    let report = introspector.run_scoped(&store, cancel).await?;

    let exported = export_report(&report, config.output.format, config.output.theme)?;
    let target = OutputTarget::resolve(config.output.path.as_deref(), config.output.format, Utc::now());
    target.write(&exported.content)?;

    info!(
        target = %target,
        format = %exported.format,
        collections = report.collections.len(),
        relationships = report.relationships.len(),
        "Diagram written"
    );

    eprintln!();
    eprintln!("Introspection complete:");
    eprintln!("  Collections: {}", report.collections.len());
    eprintln!("  Relationships: {}", report.relationships.len());
    for failure in &report.failures {
        eprintln!("  Skipped {}: {}", failure.collection, failure.error);
    }
    if report.cancelled {
        eprintln!("  Cancelled before completion; output is partial");
    }

    Ok(GenerateOutcome { report, target })
}
