//! Schema aggregation
//!
//! Merges the per-document descriptors of one collection into a single
//! [`CollectionSchema`]. The merge policy is explicit and reproducible:
//! - the field set is the union of all paths, ordered by first occurrence
//! - `null` marks a field nullable and never counts as a conflicting type
//! - objects merge their nested fields, arrays merge their element types
//! - any other disagreement widens to `Mixed`, keeping every observed type
//! - reference classification is sticky across samples

use std::collections::HashMap;

use tracing::debug;

use super::inferrer::InferredDocument;
use crate::models::{CollectionSchema, FieldDescriptor, FieldType};

/// Merge two observations of the same path
pub fn merge_types(a: FieldType, b: FieldType) -> FieldType {
    if a == b {
        return a;
    }

    match (a, b) {
        (FieldType::Null, other) | (other, FieldType::Null) => other,

        (FieldType::Unknown, other) | (other, FieldType::Unknown) => other,

        (FieldType::Array { items: a }, FieldType::Array { items: b }) => {
            FieldType::array_of(merge_types(*a, *b))
        }

        (
            FieldType::Object {
                fields: a,
                truncated: ta,
            },
            FieldType::Object {
                fields: b,
                truncated: tb,
            },
        ) => FieldType::Object {
            fields: merge_field_lists(a, b),
            truncated: ta || tb,
        },

        (FieldType::Mixed { types: a }, FieldType::Mixed { types: b }) => {
            b.into_iter().fold(FieldType::Mixed { types: a }, merge_types)
        }
        (FieldType::Mixed { mut types }, other) | (other, FieldType::Mixed { mut types }) => {
            if !types.contains(&other) {
                types.push(other);
            }
            FieldType::Mixed { types }
        }

        (a, b) => FieldType::Mixed { types: vec![a, b] },
    }
}

/// Merge two observations of the same field
pub fn merge_fields(a: FieldDescriptor, b: FieldDescriptor) -> FieldDescriptor {
    FieldDescriptor {
        path: a.path,
        field_type: merge_types(a.field_type, b.field_type),
        is_reference_candidate: a.is_reference_candidate || b.is_reference_candidate,
        nullable: a.nullable || b.nullable,
    }
}

/// Union of two ordered field lists, merging fields that share a path
fn merge_field_lists(a: Vec<FieldDescriptor>, b: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    FieldAccumulator::from_fields(a).extend(b).finish()
}

/// Insertion-ordered accumulator keyed by path
#[derive(Debug, Default)]
struct FieldAccumulator {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl FieldAccumulator {
    fn from_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self::default().extend(fields)
    }

    fn extend(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        for field in fields {
            match self.index.get(&field.path) {
                Some(&slot) => {
                    let existing = std::mem::replace(
                        &mut self.fields[slot],
                        FieldDescriptor::new(String::new(), FieldType::Unknown),
                    );
                    self.fields[slot] = merge_fields(existing, field);
                }
                None => {
                    self.index.insert(field.path.clone(), self.fields.len());
                    self.fields.push(field);
                }
            }
        }
        self
    }

    fn finish(self) -> Vec<FieldDescriptor> {
        self.fields
    }
}

/// Merge the inferred documents of one collection into its schema
///
/// Zero documents yield an empty schema.
pub fn aggregate(collection: &str, documents: Vec<InferredDocument>) -> CollectionSchema {
    let document_count = documents.len();
    let fields = documents
        .into_iter()
        .fold(FieldAccumulator::default(), |acc, doc| acc.extend(doc.fields))
        .finish();

    let mixed = fields
        .iter()
        .filter(|f| matches!(f.field_type, FieldType::Mixed { .. }))
        .count();
    debug!(
        collection,
        documents = document_count,
        fields = fields.len(),
        mixed_fields = mixed,
        "Aggregated collection schema"
    );

    CollectionSchema {
        name: collection.to_string(),
        document_count,
        fields,
        relationships: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TypeInferencer;
    use serde_json::{Value, json};

    fn docs(values: Vec<Value>) -> Vec<InferredDocument> {
        let inferencer = TypeInferencer::new();
        values
            .iter()
            .map(|v| inferencer.infer_document("test", v).unwrap())
            .collect()
    }

    #[test]
    fn test_merge_same() {
        assert_eq!(
            merge_types(FieldType::Number, FieldType::Number),
            FieldType::Number
        );
    }

    #[test]
    fn test_merge_null_is_absorbed() {
        assert_eq!(
            merge_types(FieldType::Null, FieldType::String),
            FieldType::String
        );
        assert_eq!(
            merge_types(FieldType::Reference, FieldType::Null),
            FieldType::Reference
        );
    }

    #[test]
    fn test_merge_conflict_widens_to_mixed() {
        let merged = merge_types(FieldType::String, FieldType::Number);
        assert_eq!(
            merged,
            FieldType::Mixed {
                types: vec![FieldType::String, FieldType::Number]
            }
        );

        let merged = merge_types(merged, FieldType::Boolean);
        let FieldType::Mixed { types } = merged else {
            panic!("Expected mixed type");
        };
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn test_merge_mixed_does_not_duplicate() {
        let mixed = FieldType::Mixed {
            types: vec![FieldType::String, FieldType::Number],
        };
        assert_eq!(merge_types(mixed.clone(), FieldType::String), mixed);
        assert_eq!(merge_types(mixed.clone(), mixed.clone()), mixed);
    }

    #[test]
    fn test_merge_arrays() {
        let merged = merge_types(
            FieldType::array_of(FieldType::Unknown),
            FieldType::array_of(FieldType::String),
        );
        assert_eq!(merged, FieldType::array_of(FieldType::String));
    }

    #[test]
    fn test_aggregate_union_in_first_seen_order() {
        let schema = aggregate(
            "users",
            docs(vec![
                json!({"_id": 1, "name": "Alice"}),
                json!({"_id": 2, "email": "bob@example.com", "name": "Bob"}),
            ]),
        );

        let paths: Vec<_> = schema.fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["_id", "name", "email"]);
        assert_eq!(schema.document_count, 2);
    }

    #[test]
    fn test_aggregate_widening_law() {
        let schema = aggregate("things", docs(vec![json!({"p": "text"}), json!({"p": 42})]));
        assert!(matches!(
            schema.field("p").unwrap().field_type,
            FieldType::Mixed { .. }
        ));
    }

    #[test]
    fn test_aggregate_reference_sticky() {
        let schema = aggregate(
            "posts",
            docs(vec![
                json!({"author_id": null}),
                json!({"author_id": {"$oid": "507f1f77bcf86cd799439011"}}),
                json!({"author_id": null}),
            ]),
        );
        let field = schema.field("author_id").unwrap();
        assert!(field.is_reference_candidate);
        assert!(field.nullable);
        assert_eq!(field.field_type, FieldType::Reference);
    }

    #[test]
    fn test_aggregate_merges_nested_objects() {
        let schema = aggregate(
            "users",
            docs(vec![
                json!({"address": {"city": "Berlin"}}),
                json!({"address": {"zip": "10115", "city": "Hamburg"}}),
            ]),
        );

        let paths: Vec<_> = schema.fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["address", "address.city", "address.zip"]);

        let FieldType::Object { fields, .. } = &schema.field("address").unwrap().field_type else {
            panic!("Expected object type");
        };
        let nested: Vec<_> = fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(nested, vec!["address.city", "address.zip"]);
    }

    #[test]
    fn test_aggregate_empty() {
        let schema = aggregate("empty", Vec::new());
        assert!(schema.fields.is_empty());
        assert!(schema.relationships.is_empty());
        assert_eq!(schema.document_count, 0);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let samples = vec![
            json!({"a": 1, "b": {"c": "x"}, "d": [1]}),
            json!({"b": {"e": null}, "a": "y", "f": []}),
        ];
        let first = aggregate("c", docs(samples.clone()));
        let second = aggregate("c", docs(samples));
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
