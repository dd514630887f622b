//! Structured report exporter (JSON and YAML)

use super::{ExportError, ExportResult};
use crate::models::SchemaReport;

/// Exporter for machine-readable schema reports
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportExporter;

impl ReportExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export as pretty-printed JSON
    pub fn export_json(&self, report: &SchemaReport) -> Result<ExportResult, ExportError> {
        let mut content = serde_json::to_string_pretty(report)?;
        content.push('\n');
        Ok(ExportResult {
            content,
            format: "json".to_string(),
        })
    }

    /// Export as YAML
    pub fn export_yaml(&self, report: &SchemaReport) -> Result<ExportResult, ExportError> {
        Ok(ExportResult {
            content: serde_yaml::to_string(report)?,
            format: "yaml".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionSchema, Confidence, FieldDescriptor, FieldType, RelationshipEdge};

    fn report() -> SchemaReport {
        let edge = RelationshipEdge::new("posts", "users", "author_id", Confidence::NameHeuristic);
        let posts = CollectionSchema {
            name: "posts".to_string(),
            document_count: 3,
            fields: vec![FieldDescriptor::new("author_id", FieldType::Reference)],
            relationships: vec![edge.clone()],
        };
        let mut report = SchemaReport::new(vec![posts], vec![edge]);
        report.database = Some("blog".to_string());
        report
    }

    #[test]
    fn test_json_shape() {
        let result = ReportExporter::new().export_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();

        assert_eq!(value["database"], "blog");
        assert_eq!(value["collections"][0]["documentCount"], 3);
        assert_eq!(value["collections"][0]["fields"][0]["fieldType"]["kind"], "reference");
        assert_eq!(value["relationships"][0]["cardinality"], "one-to-many");
        assert_eq!(value["relationships"][0]["confidence"], "nameHeuristic");
        assert!(value.get("failures").is_none());
        assert!(value.get("cancelled").is_none());
    }

    #[test]
    fn test_yaml_parses_back() {
        let result = ReportExporter::new().export_yaml(&report()).unwrap();
        assert_eq!(result.format, "yaml");
        let parsed: SchemaReport = serde_yaml::from_str(&result.content).unwrap();
        assert_eq!(parsed, report());
    }
}
