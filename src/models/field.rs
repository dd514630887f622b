//! Field type model
//!
//! A field is identified by its dotted path inside a document (`address.city`).
//! Its inferred classification is a closed [`FieldType`] enumeration so every
//! consumer (aggregator, relationship detector, diagram synthesizer) matches
//! all cases exhaustively.

use serde::{Deserialize, Serialize};

/// Inferred type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldType {
    /// Explicit `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any numeric value, including Extended JSON number wrappers
    Number,
    /// Plain string
    String,
    /// `{"$date": ..}` or an ISO-8601 string when format detection is on
    Date,
    /// Store-native identifier (`{"$oid": ..}`, DBRef)
    Reference,
    /// Array typed by its first element only
    Array { items: Box<FieldType> },
    /// Embedded document
    Object {
        fields: Vec<FieldDescriptor>,
        /// Set when the depth bound stopped the descent
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
    /// Conflicting observations across samples
    Mixed { types: Vec<FieldType> },
    /// No observation (element type of an empty array)
    Unknown,
}

impl FieldType {
    /// Lower-case tag used in diagrams and diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Reference => "ObjectId",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
            FieldType::Mixed { .. } => "mixed",
            FieldType::Unknown => "unknown",
        }
    }

    /// An empty object type
    pub fn object() -> Self {
        FieldType::Object {
            fields: Vec::new(),
            truncated: false,
        }
    }

    /// An array type with the given element type
    pub fn array_of(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
        }
    }

    /// Whether a value of this type points at another document
    ///
    /// Arrays of references count as references too.
    pub fn is_reference(&self) -> bool {
        match self {
            FieldType::Reference => true,
            FieldType::Array { items } => items.is_reference(),
            FieldType::Mixed { types } => types.iter().any(FieldType::is_reference),
            FieldType::Null
            | FieldType::Boolean
            | FieldType::Number
            | FieldType::String
            | FieldType::Date
            | FieldType::Object { .. }
            | FieldType::Unknown => false,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Array { items } => write!(f, "array<{}>", items),
            FieldType::Object { truncated: true, .. } => write!(f, "object(truncated)"),
            FieldType::Mixed { types } => {
                let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "mixed<{}>", names.join("|"))
            }
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// Inferred descriptor for one dotted field path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Dotted path, unique within a collection schema
    pub path: String,
    /// Inferred type
    pub field_type: FieldType,
    /// The value looks like a foreign identifier in at least one sample
    pub is_reference_candidate: bool,
    /// A `null` was observed for this path in at least one sample
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDescriptor {
    /// Create a descriptor, deriving the reference flag from the type
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        let is_reference_candidate = field_type.is_reference();
        let nullable = matches!(field_type, FieldType::Null);
        Self {
            path: path.into(),
            field_type,
            is_reference_candidate,
            nullable,
        }
    }

    /// Last segment of the dotted path
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Nesting depth: 0 for top-level fields
    pub fn depth(&self) -> usize {
        self.path.matches('.').count()
    }

    /// Whether this is a top-level field
    pub fn is_top_level(&self) -> bool {
        !self.path.contains('.')
    }

    /// Whether this is the document identity field (`_id`)
    pub fn is_identity(&self) -> bool {
        self.name() == "_id"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_detection() {
        assert!(FieldType::Reference.is_reference());
        assert!(FieldType::array_of(FieldType::Reference).is_reference());
        assert!(!FieldType::array_of(FieldType::String).is_reference());
        assert!(!FieldType::object().is_reference());
    }

    #[test]
    fn test_descriptor_path_helpers() {
        let field = FieldDescriptor::new("address.geo.lat", FieldType::Number);
        assert_eq!(field.name(), "lat");
        assert_eq!(field.depth(), 2);
        assert!(!field.is_top_level());

        let id = FieldDescriptor::new("_id", FieldType::Reference);
        assert!(id.is_identity());
        assert!(id.is_reference_candidate);
    }

    #[test]
    fn test_display() {
        let mixed = FieldType::Mixed {
            types: vec![FieldType::String, FieldType::Number],
        };
        assert_eq!(mixed.to_string(), "mixed<string|number>");
        assert_eq!(
            FieldType::array_of(FieldType::Unknown).to_string(),
            "array<unknown>"
        );
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(FieldType::array_of(FieldType::Reference)).unwrap();
        assert_eq!(json["kind"], "array");
        assert_eq!(json["items"]["kind"], "reference");
    }
}
