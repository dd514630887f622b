//! Plain-text diagram exporter
//!
//! Fallback for terminals and logs where Mermaid cannot be rendered.

use super::synthesizer::DiagramSynthesizer;
use super::{ExportError, ExportResult};
use crate::models::{Attribute, DiagramDescription, SchemaReport};

const INDENT: &str = "  ";

/// Placeholder under the relationships heading of a collection without edges
const NO_RELATIONSHIPS: &str = "(none)";

/// Legend appended to every plain-text diagram
pub const LEGEND: &str = "Legend:\n  PK  document identity (_id)\n  FK  field referencing another collection\n  →   many referencing documents to one referenced document\n";

/// Exporter for the plain-text diagram
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiExporter;

impl AsciiExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render a diagram description as plain text
    ///
    /// Nested attributes are indented below their parent. Every entity gets a
    /// relationships sub-section listing the edges that leave it.
    pub fn render(&self, diagram: &DiagramDescription) -> String {
        let mut out = String::new();

        for entity in &diagram.entities {
            out.push_str(&format!("Collection: {}\n", entity.name));
            for attribute in &entity.attributes {
                write_attribute(&mut out, attribute, 1);
            }

            let outgoing: Vec<_> = diagram
                .relationships
                .iter()
                .filter(|s| s.from == entity.name)
                .collect();
            out.push_str(&format!("{}Relationships:\n", INDENT));
            if outgoing.is_empty() {
                out.push_str(&format!("{}{}\n", INDENT.repeat(2), NO_RELATIONSHIPS));
            }
            for statement in outgoing {
                out.push_str(&format!(
                    "{}{} → {}\n",
                    INDENT.repeat(2),
                    statement.label,
                    statement.to
                ));
            }
            out.push('\n');
        }

        out.push_str(LEGEND);
        out
    }

    /// Export a schema report as a plain-text diagram
    pub fn export(&self, report: &SchemaReport) -> Result<ExportResult, ExportError> {
        let diagram = DiagramSynthesizer::new().describe(report);
        Ok(ExportResult {
            content: self.render(&diagram),
            format: "ascii".to_string(),
        })
    }
}

fn write_attribute(out: &mut String, attribute: &Attribute, level: usize) {
    out.push_str(&INDENT.repeat(level));
    out.push_str(&format!("{}: {}", attribute.name, attribute.type_name));
    if let Some(key) = attribute.key {
        out.push_str(&format!(" [{}]", key.as_str()));
    }
    out.push('\n');
    for child in &attribute.children {
        write_attribute(out, child, level + 1);
    }
}
