//! Relationship model

use serde::{Deserialize, Serialize};

/// Cardinality of a relationship edge
///
/// Only the one-to-many default is ever produced; it is a declared heuristic
/// (many referencing documents, one referenced document), not a derived fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[default]
    OneToMany,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::OneToMany => write!(f, "one-to-many"),
        }
    }
}

/// How the target collection of an edge was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Confidence {
    /// Guessed from the field name
    NameHeuristic,
    /// A sampled identifier was found in the target collection
    ExistenceConfirmed,
}

/// Proposed foreign-key-like link from one collection's field to another collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub from_collection: String,
    pub to_collection: String,
    /// Dotted field path in `from_collection`
    pub via_field: String,
    pub cardinality: Cardinality,
    pub confidence: Confidence,
}

impl RelationshipEdge {
    pub fn new(
        from_collection: impl Into<String>,
        to_collection: impl Into<String>,
        via_field: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            from_collection: from_collection.into(),
            to_collection: to_collection.into(),
            via_field: via_field.into(),
            cardinality: Cardinality::default(),
            confidence,
        }
    }

    /// Identity used for deduplication
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.from_collection, &self.to_collection, &self.via_field)
    }
}

/// Remove edges sharing `(from, to, via)`, keeping the first occurrence
pub fn dedup_edges(edges: Vec<RelationshipEdge>) -> Vec<RelationshipEdge> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::with_capacity(edges.len());
    for edge in edges {
        let key = (
            edge.from_collection.clone(),
            edge.to_collection.clone(),
            edge.via_field.clone(),
        );
        if seen.insert(key) {
            result.push(edge);
        }
    }
    result
}
