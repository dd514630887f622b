//! Mermaid `erDiagram` exporter

use serde::{Deserialize, Serialize};

use super::synthesizer::DiagramSynthesizer;
use super::{ExportError, ExportResult};
use crate::models::{DiagramDescription, SchemaReport};

/// Mermaid theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Forest => "forest",
            Theme::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "dark" => Ok(Theme::Dark),
            "forest" => Ok(Theme::Forest),
            "neutral" => Ok(Theme::Neutral),
            other => Err(format!(
                "Unknown theme '{}', expected one of: default, dark, forest, neutral",
                other
            )),
        }
    }
}

/// Exporter for Mermaid ER notation
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidExporter {
    theme: Theme,
}

impl MermaidExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    /// Render a diagram description as Mermaid text
    ///
    /// Entity blocks list top-level attributes only. A non-default theme adds
    /// an `init` directive before `erDiagram`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mongodb_erd::export::MermaidExporter;
    /// use mongodb_erd::models::{Attribute, DiagramDescription, EntityBlock, KeyMarker};
    ///
    /// let diagram = DiagramDescription {
    ///     entities: vec![EntityBlock {
    ///         name: "users".to_string(),
    ///         attributes: vec![Attribute {
    ///             type_name: "ObjectId".to_string(),
    ///             name: "_id".to_string(),
    ///             key: Some(KeyMarker::Pk),
    ///             children: Vec::new(),
    ///         }],
    ///     }],
    ///     relationships: Vec::new(),
    /// };
    ///
    /// let text = MermaidExporter::new().render(&diagram);
    /// assert_eq!(text, "erDiagram\n    users {\n        ObjectId _id PK\n    }\n");
    /// ```
    pub fn render(&self, diagram: &DiagramDescription) -> String {
        let mut out = String::new();
        if self.theme != Theme::Default {
            out.push_str(&format!(
                "%%{{init: {{\"theme\": \"{}\"}}}}%%\n",
                self.theme
            ));
        }
        out.push_str("erDiagram\n");

        for (i, entity) in diagram.entities.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("    {} {{\n", entity.name));
            for attribute in &entity.attributes {
                out.push_str(&format!("        {} {}", attribute.type_name, attribute.name));
                if let Some(key) = attribute.key {
                    out.push(' ');
                    out.push_str(key.as_str());
                }
                out.push('\n');
            }
            out.push_str("    }\n");
        }

        if !diagram.relationships.is_empty() {
            out.push('\n');
        }
        for statement in &diagram.relationships {
            out.push_str(&format!(
                "    {} {} {} : \"{}\"\n",
                statement.from, statement.marker, statement.to, statement.label
            ));
        }

        out
    }

    /// Export a schema report as Mermaid text
    pub fn export(&self, report: &SchemaReport) -> Result<ExportResult, ExportError> {
        let diagram = DiagramSynthesizer::new().describe(report);
        Ok(ExportResult {
            content: self.render(&diagram),
            format: "mermaid".to_string(),
        })
    }
}
