//! Diagram synthesis
//!
//! Turns a [`SchemaReport`] into a renderer-neutral [`DiagramDescription`].

use super::sanitize_identifier;
use crate::models::{
    Attribute, CollectionSchema, DiagramDescription, EntityBlock, FieldDescriptor, FieldType,
    KeyMarker, RelationshipEdge, RelationshipStatement, SchemaReport,
};

/// Crow's-foot marker: many referencing documents to one referenced document
pub const ONE_TO_MANY_MARKER: &str = "}o--||";

/// Builds diagram descriptions from schema reports
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramSynthesizer;

impl DiagramSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Describe `report` as entity blocks and relationship statements
    ///
    /// Entities follow collection order and relationship statements follow
    /// edge order. Names colliding after sanitization keep the position of
    /// the first occurrence and the content of the last.
    pub fn describe(&self, report: &SchemaReport) -> DiagramDescription {
        let mut description = DiagramDescription::default();

        for schema in &report.collections {
            let block = EntityBlock {
                name: sanitize_identifier(&schema.name),
                attributes: entity_attributes(schema),
            };
            upsert(&mut description.entities, block, |e| &e.name);
        }

        for edge in &report.relationships {
            let statement = relationship_statement(edge);
            let duplicate = description.relationships.iter().any(|s| {
                s.from == statement.from && s.to == statement.to && s.label == statement.label
            });
            if !duplicate {
                description.relationships.push(statement);
            }
        }

        description
    }
}

/// Insert `item`, replacing in place an existing item with the same name
fn upsert<T>(items: &mut Vec<T>, item: T, name: impl Fn(&T) -> &String) {
    match items.iter().position(|existing| name(existing) == name(&item)) {
        Some(slot) => items[slot] = item,
        None => items.push(item),
    }
}

fn entity_attributes(schema: &CollectionSchema) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    for field in schema.top_level_fields() {
        let key = if field.is_identity() {
            Some(KeyMarker::Pk)
        } else if schema.has_relationship_via(&field.path) {
            Some(KeyMarker::Fk)
        } else {
            None
        };
        let mut attr = attribute(field);
        attr.key = key;
        upsert(&mut attributes, attr, |a| &a.name);
    }
    attributes
}

/// Attribute for `field`, with nested attributes for embedded documents
fn attribute(field: &FieldDescriptor) -> Attribute {
    let nested: &[FieldDescriptor] = match &field.field_type {
        FieldType::Object { fields, .. } => fields.as_slice(),
        FieldType::Array { items } => match items.as_ref() {
            FieldType::Object { fields, .. } => fields.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut children = Vec::new();
    for child in nested {
        upsert(&mut children, attribute(child), |a| &a.name);
    }

    Attribute {
        type_name: sanitize_identifier(field.field_type.type_name()),
        name: sanitize_identifier(field.name()),
        key: None,
        children,
    }
}

fn relationship_statement(edge: &RelationshipEdge) -> RelationshipStatement {
    RelationshipStatement {
        from: sanitize_identifier(&edge.from_collection),
        to: sanitize_identifier(&edge.to_collection),
        marker: ONE_TO_MANY_MARKER.to_string(),
        label: sanitize_identifier(&edge.via_field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn schema(name: &str, fields: Vec<FieldDescriptor>) -> CollectionSchema {
        CollectionSchema {
            name: name.to_string(),
            document_count: 1,
            fields,
            relationships: Vec::new(),
        }
    }

    #[test]
    fn test_describe_keys_and_order() {
        let mut posts = schema(
            "posts",
            vec![
                FieldDescriptor::new("_id", FieldType::Reference),
                FieldDescriptor::new("author_id", FieldType::Reference),
                FieldDescriptor::new("title", FieldType::String),
            ],
        );
        let edge = RelationshipEdge::new("posts", "users", "author_id", Confidence::NameHeuristic);
        posts.relationships.push(edge.clone());
        let report = SchemaReport::new(vec![posts], vec![edge]);

        let diagram = DiagramSynthesizer::new().describe(&report);
        let entity = diagram.entity("posts").unwrap();
        let names: Vec<_> = entity.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["_id", "author_id", "title"]);
        assert_eq!(entity.attributes[0].key, Some(KeyMarker::Pk));
        assert_eq!(entity.attributes[0].type_name, "ObjectId");
        assert_eq!(entity.attributes[1].key, Some(KeyMarker::Fk));
        assert_eq!(entity.attributes[2].key, None);

        assert_eq!(diagram.relationships.len(), 1);
        assert_eq!(diagram.relationships[0].marker, ONE_TO_MANY_MARKER);
    }

    #[test]
    fn test_top_level_only_with_children() {
        let city = FieldDescriptor::new("address.city", FieldType::String);
        let address = FieldDescriptor::new(
            "address",
            FieldType::Object {
                fields: vec![city.clone()],
                truncated: false,
            },
        );
        let report = SchemaReport::new(vec![schema("users", vec![address, city])], Vec::new());

        let diagram = DiagramSynthesizer::new().describe(&report);
        let entity = diagram.entity("users").unwrap();
        assert_eq!(entity.attributes.len(), 1);
        assert_eq!(entity.attributes[0].type_name, "object");
        assert_eq!(entity.attributes[0].children[0].name, "city");
    }

    #[test]
    fn test_collisions_last_write_wins_at_first_position() {
        let report = SchemaReport::new(
            vec![
                schema("a-b", vec![FieldDescriptor::new("x", FieldType::String)]),
                schema("other", Vec::new()),
                schema("a.b", vec![FieldDescriptor::new("y", FieldType::Number)]),
            ],
            Vec::new(),
        );

        let diagram = DiagramSynthesizer::new().describe(&report);
        let names: Vec<_> = diagram.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a_b", "other"]);
        assert_eq!(diagram.entities[0].attributes[0].name, "y");
    }

    #[test]
    fn test_empty_report() {
        let diagram = DiagramSynthesizer::new().describe(&SchemaReport::default());
        assert!(diagram.entities.is_empty());
        assert!(diagram.relationships.is_empty());
    }
}
