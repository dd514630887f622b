//! Diagram description model
//!
//! The renderer-neutral handoff between the synthesizer and the notation
//! writers. All names in here are already sanitized.

use serde::{Deserialize, Serialize};

/// Key marker rendered after an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyMarker {
    /// Document identity (`_id`)
    Pk,
    /// Field with an outgoing relationship
    Fk,
}

impl KeyMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMarker::Pk => "PK",
            KeyMarker::Fk => "FK",
        }
    }
}

/// One attribute line of an entity block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub type_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyMarker>,
    /// Nested attributes (plain-text form only expands them)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Attribute>,
}

/// One entity block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBlock {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// One relationship statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStatement {
    pub from: String,
    pub to: String,
    /// Mermaid crow's-foot marker
    pub marker: String,
    pub label: String,
}

/// Ordered entity blocks followed by ordered relationship statements
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDescription {
    pub entities: Vec<EntityBlock>,
    pub relationships: Vec<RelationshipStatement>,
}

impl DiagramDescription {
    pub fn entity(&self, name: &str) -> Option<&EntityBlock> {
        self.entities.iter().find(|e| e.name == name)
    }
}
