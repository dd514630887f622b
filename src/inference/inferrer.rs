//! Per-document type inference
//!
//! Walks one document and returns its field descriptors as a value. Nothing is
//! accumulated across documents here; merging is the aggregator's job.

use serde_json::Value;

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::formats::{Format, Wrapper, detect_format, detect_wrapper};
use crate::models::{FieldDescriptor, FieldType};

/// Field descriptors inferred from a single document
///
/// Fields are flattened in document order, every parent before its children.
/// Object descriptors also carry their children recursively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferredDocument {
    pub fields: Vec<FieldDescriptor>,
}

impl InferredDocument {
    /// Look up a field by its dotted path
    pub fn get(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Dotted paths in document order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Type inferencer
///
/// Descent is bounded by path depth rather than document identity, so embedded
/// documents without an `_id` cannot recurse without limit.
#[derive(Debug, Clone, Default)]
pub struct TypeInferencer {
    config: InferenceConfig,
}

impl TypeInferencer {
    /// Create a new inferencer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new inferencer with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer field descriptors from a JSON string
    pub fn infer_json(
        &self,
        collection: &str,
        json: &str,
    ) -> Result<InferredDocument, InferenceError> {
        let value: Value = serde_json::from_str(json)?;
        self.infer_document(collection, &value)
    }

    /// Infer field descriptors from one document of `collection`
    pub fn infer_document(
        &self,
        collection: &str,
        document: &Value,
    ) -> Result<InferredDocument, InferenceError> {
        let Value::Object(obj) = document else {
            return Err(InferenceError::InvalidStructure {
                collection: collection.to_string(),
                found: value_type_name(document).to_string(),
            });
        };

        let mut fields = Vec::new();
        for (key, value) in obj {
            let (field_type, children) = self.infer_value(value, key, 0);
            fields.push(FieldDescriptor::new(key.clone(), field_type));
            fields.extend(children);
        }

        Ok(InferredDocument { fields })
    }

    /// Infer the type of `value` found at `path`
    ///
    /// Returns the type and the flattened descriptors of everything below it.
    fn infer_value(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> (FieldType, Vec<FieldDescriptor>) {
        match value {
            Value::Null => (FieldType::Null, Vec::new()),
            Value::Bool(_) => (FieldType::Boolean, Vec::new()),
            Value::Number(_) => (FieldType::Number, Vec::new()),
            Value::String(s) => (self.infer_string(s), Vec::new()),
            Value::Array(items) => match items.first() {
                None => (FieldType::array_of(FieldType::Unknown), Vec::new()),
                Some(_) if depth >= self.config.max_depth => {
                    (FieldType::array_of(FieldType::Unknown), Vec::new())
                }
                // Only the first element is inspected
                Some(first) => {
                    let (item_type, children) = self.infer_value(first, path, depth + 1);
                    (FieldType::array_of(item_type), children)
                }
            },
            Value::Object(obj) => match detect_wrapper(obj) {
                Some(Wrapper::ObjectId | Wrapper::Uuid | Wrapper::DbRef) => {
                    (FieldType::Reference, Vec::new())
                }
                Some(Wrapper::Date | Wrapper::Timestamp) => (FieldType::Date, Vec::new()),
                Some(Wrapper::Number) => (FieldType::Number, Vec::new()),
                Some(Wrapper::Binary | Wrapper::Text) => (FieldType::String, Vec::new()),
                Some(Wrapper::Bound) => (FieldType::Unknown, Vec::new()),
                None if depth >= self.config.max_depth => (
                    FieldType::Object {
                        fields: Vec::new(),
                        truncated: true,
                    },
                    Vec::new(),
                ),
                None => {
                    let mut nested = Vec::with_capacity(obj.len());
                    let mut flattened = Vec::new();
                    for (key, child) in obj {
                        let child_path = format!("{}.{}", path, key);
                        let (child_type, grandchildren) =
                            self.infer_value(child, &child_path, depth + 1);
                        let descriptor = FieldDescriptor::new(child_path, child_type);
                        nested.push(descriptor.clone());
                        flattened.push(descriptor);
                        flattened.extend(grandchildren);
                    }
                    (
                        FieldType::Object {
                            fields: nested,
                            truncated: false,
                        },
                        flattened,
                    )
                }
            },
        }
    }

    fn infer_string(&self, s: &str) -> FieldType {
        if !self.config.detect_formats && !self.config.string_ids_as_references {
            return FieldType::String;
        }
        match detect_format(s) {
            Format::ObjectId if self.config.string_ids_as_references => FieldType::Reference,
            Format::Date | Format::DateTime if self.config.detect_formats => FieldType::Date,
            _ => FieldType::String,
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
