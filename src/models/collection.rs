//! Collection schema and introspection report models

use serde::{Deserialize, Serialize};

use super::field::FieldDescriptor;
use super::relationship::RelationshipEdge;

/// Aggregated schema of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    pub name: String,
    /// Number of documents the schema was inferred from
    pub document_count: usize,
    /// Flattened fields, in first-seen order across samples
    pub fields: Vec<FieldDescriptor>,
    /// Edges leaving this collection
    #[serde(default)]
    pub relationships: Vec<RelationshipEdge>,
}

impl CollectionSchema {
    /// Schema of a collection with no sampled documents
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_count: 0,
            fields: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Look up a field by its dotted path
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Fields without a parent
    pub fn top_level_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_top_level())
    }

    /// Fields eligible for relationship detection
    pub fn reference_candidates(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.is_reference_candidate && !f.is_identity())
    }

    /// Whether a relationship leaves through the given field
    pub fn has_relationship_via(&self, path: &str) -> bool {
        self.relationships.iter().any(|r| r.via_field == path)
    }
}

/// A collection that could not be introspected under the partial-result policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFailure {
    pub collection: String,
    pub error: String,
}

/// Result of one introspection run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    /// Database the collections belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub collections: Vec<CollectionSchema>,
    /// All edges, deduplicated
    pub relationships: Vec<RelationshipEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CollectionFailure>,
    /// The run was cancelled before every collection completed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl SchemaReport {
    pub fn new(collections: Vec<CollectionSchema>, relationships: Vec<RelationshipEdge>) -> Self {
        Self {
            database: None,
            collections,
            relationships,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// Look up a collection schema by name
    pub fn collection(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.iter().find(|c| c.name == name)
    }
}
