//! Export functionality
//!
//! Provides exporters for the formats a schema report can be written in:
//! - Mermaid `erDiagram` notation
//! - Plain text (ASCII) diagram
//! - JSON and YAML reports
//!
//! Diagram exporters go through [`DiagramSynthesizer`], which sanitizes every
//! identifier once so the writers never fail on odd collection or field names.

pub mod ascii;
pub mod mermaid;
pub mod report;
pub mod synthesizer;

use crate::models::SchemaReport;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err.to_string())
    }
}

/// Output format of a schema report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Mermaid `erDiagram` notation
    #[default]
    Mermaid,
    /// Plain-text diagram
    Ascii,
    /// JSON report
    Json,
    /// YAML report
    Yaml,
}

impl OutputFormat {
    /// File extension used for default output paths
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mmd",
            OutputFormat::Ascii => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Ascii => "ascii",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "ascii" | "text" | "txt" => Ok(OutputFormat::Ascii),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "Unknown output format '{}', expected one of: mermaid, ascii, json, yaml",
                other
            )),
        }
    }
}

/// Export `report` in `format`; `theme` only affects Mermaid output
pub fn export_report(
    report: &SchemaReport,
    format: OutputFormat,
    theme: Theme,
) -> Result<ExportResult, ExportError> {
    match format {
        OutputFormat::Mermaid => MermaidExporter::with_theme(theme).export(report),
        OutputFormat::Ascii => AsciiExporter::new().export(report),
        OutputFormat::Json => ReportExporter::new().export_json(report),
        OutputFormat::Yaml => ReportExporter::new().export_yaml(report),
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
///
/// An empty name becomes `_`, and a leading digit gets a `_` prefix so the
/// result is a valid Mermaid identifier. Distinct names may collide after
/// sanitization.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    out.extend(
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }),
    );
    out
}

pub use ascii::AsciiExporter;
pub use mermaid::{MermaidExporter, Theme};
pub use report::ReportExporter;
pub use synthesizer::DiagramSynthesizer;
